//! Cached problem state: flat, typed parallel arrays for points and
//! segments, built lazily on the first `step()` (spec §3.3) so that
//! constructing an [`crate::Engine`] for inspection never pays setup cost.

use std::collections::HashMap;

use crate::geometry::Vec2;
use crate::layers::{LayerMembership, LayerTable};
use crate::problem::{Bounds, Problem};

/// `ln(1000)`: the gap at which an exponential tail has decayed 1000x,
/// used to size the broadphase influence radius (spec §4.2 step 4).
const LN_1000: f32 = 6.907_755_3;

pub struct CachedState {
    // Points, indexed 0..n_points.
    pub point_ids: Vec<String>,
    pub px: Vec<f32>,
    pub py: Vec<f32>,
    pub radius: Vec<f32>,
    pub movable: Vec<bool>,
    pub point_layers: Vec<LayerMembership>,
    pub fx: Vec<f32>,
    pub fy: Vec<f32>,
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,
    point_index: HashMap<String, usize>,

    // Segments, indexed 0..n_segments.
    pub seg_a: Vec<Option<usize>>,
    pub seg_b: Vec<Option<usize>>,
    pub seg_half_width: Vec<f32>,
    pub seg_layer: Vec<Option<usize>>,
    pub seg_fixed_length: Vec<bool>,
    pub seg_fixed_orientation: Vec<bool>,
    pub seg_rest_length: Vec<f32>,
    pub seg_rest_angle: Vec<f32>,

    pub bounds: Option<Bounds>,
    pub layer_table: LayerTable,
    pub global_influence: f32,
    pub cell_size: f32,
}

impl CachedState {
    pub fn build(problem: &Problem) -> CachedState {
        let mut layer_table = LayerTable::new();
        for p in &problem.points {
            for l in &p.layers {
                layer_table.intern(l);
            }
        }
        for s in &problem.segments {
            layer_table.intern(&s.layer);
        }
        let uses_bitmask = layer_table.uses_bitmask();

        let point_index: HashMap<String, usize> = problem
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let n_points = problem.points.len();
        let mut point_layers = Vec::with_capacity(n_points);
        let mut px = Vec::with_capacity(n_points);
        let mut py = Vec::with_capacity(n_points);
        let mut radius = Vec::with_capacity(n_points);
        let mut movable = Vec::with_capacity(n_points);
        for p in &problem.points {
            px.push(p.x);
            py.push(p.y);
            radius.push(p.radius.max(0.0));
            movable.push(p.movable);
            let mut mask = LayerMembership::empty(uses_bitmask);
            for l in &p.layers {
                if let Some(idx) = layer_table.get(l) {
                    mask.insert(idx);
                }
            }
            point_layers.push(mask);
        }

        let n_segments = problem.segments.len();
        let mut seg_a = Vec::with_capacity(n_segments);
        let mut seg_b = Vec::with_capacity(n_segments);
        let mut seg_half_width = Vec::with_capacity(n_segments);
        let mut seg_layer = Vec::with_capacity(n_segments);
        let mut seg_fixed_length = Vec::with_capacity(n_segments);
        let mut seg_fixed_orientation = Vec::with_capacity(n_segments);
        let mut seg_rest_length = Vec::with_capacity(n_segments);
        let mut seg_rest_angle = Vec::with_capacity(n_segments);
        for s in &problem.segments {
            let a = point_index.get(&s.a).copied();
            let b = point_index.get(&s.b).copied();
            let (geom_length, geom_angle) = match (a, b) {
                (Some(ai), Some(bi)) => {
                    let da = Vec2::new(px[ai], py[ai]);
                    let db = Vec2::new(px[bi], py[bi]);
                    let d = db - da;
                    (d.len(), d.y.atan2(d.x))
                }
                _ => (0.0, 0.0),
            };
            let rest_length = s.rest_length.unwrap_or(geom_length);
            let rest_angle = s.rest_angle.unwrap_or(geom_angle);
            seg_a.push(a);
            seg_b.push(b);
            seg_half_width.push(s.width * 0.5);
            seg_layer.push(layer_table.get(&s.layer));
            seg_fixed_length.push(s.fixed_length);
            seg_fixed_orientation.push(s.fixed_orientation);
            seg_rest_length.push(rest_length);
            seg_rest_angle.push(rest_angle);
        }

        let max_point_radius = radius.iter().cloned().fold(0.0f32, f32::max);
        let max_seg_half_width = seg_half_width.iter().cloned().fold(0.0f32, f32::max);
        let max_min_sep = problem
            .interactions
            .segment_segment_repel
            .min_separation
            .max(problem.interactions.point_segment_repel.min_separation);
        let base_sep = (max_point_radius + max_seg_half_width).max(2.0 * max_seg_half_width) + max_min_sep;

        let min_positive_decay = [
            problem.interactions.segment_segment_repel.exponential_decay,
            problem.interactions.point_segment_repel.exponential_decay,
        ]
        .into_iter()
        .filter(|&d| d > 0.0)
        .fold(None, |acc: Option<f32>, d| match acc {
            Some(a) => Some(a.min(d)),
            None => Some(d),
        });
        let cutoff_gap = match min_positive_decay {
            Some(d) => LN_1000 / d,
            None => 10.0 * base_sep + 1.0,
        };
        let global_influence = base_sep + cutoff_gap;
        let cell_size = global_influence.max(1e-3);

        CachedState {
            point_ids: problem.points.iter().map(|p| p.id.clone()).collect(),
            px,
            py,
            radius,
            movable,
            point_layers,
            fx: vec![0.0; n_points],
            fy: vec![0.0; n_points],
            vx: vec![0.0; n_points],
            vy: vec![0.0; n_points],
            point_index,
            seg_a,
            seg_b,
            seg_half_width,
            seg_layer,
            seg_fixed_length,
            seg_fixed_orientation,
            seg_rest_length,
            seg_rest_angle,
            bounds: problem.bounds,
            layer_table,
            global_influence,
            cell_size,
        }
    }

    pub fn point_index_of(&self, id: &str) -> Option<usize> {
        self.point_index.get(id).copied()
    }

    pub fn n_points(&self) -> usize {
        self.px.len()
    }

    pub fn n_segments(&self) -> usize {
        self.seg_a.len()
    }

    pub fn segment_inert(&self, i: usize) -> bool {
        self.seg_a[i].is_none() || self.seg_b[i].is_none()
    }

    pub fn point_pos(&self, i: usize) -> Vec2 {
        Vec2::new(self.px[i], self.py[i])
    }

    pub fn clear_forces(&mut self) {
        for v in self.fx.iter_mut() {
            *v = 0.0;
        }
        for v in self.fy.iter_mut() {
            *v = 0.0;
        }
    }

    pub fn add_force(&mut self, i: usize, f: Vec2) {
        if f.x.is_finite() && f.y.is_finite() {
            self.fx[i] += f.x;
            self.fy[i] += f.y;
        }
    }
}

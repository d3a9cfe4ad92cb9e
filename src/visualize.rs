//! A reporting-only rendering description (spec §6). Never mutates
//! engine state; a renderer (out of scope for this crate) consumes it.

use serde::{Deserialize, Serialize};

use crate::engine::Engine;

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct RectScene {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointScene {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub movable: bool,
    /// `radius` plus the largest configured point-repulsion clearance;
    /// the halo a renderer would draw to show the point's influence.
    pub separation_halo: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentScene {
    pub id: String,
    pub ax: f32,
    pub ay: f32,
    pub bx: f32,
    pub by: f32,
    pub half_width: f32,
    /// `half_width` plus the largest configured segment-repulsion
    /// clearance.
    pub buffer_halo: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneDescription {
    pub iterations: usize,
    pub bounds: Option<RectScene>,
    pub effective_bounds: Option<RectScene>,
    pub points: Vec<PointScene>,
    pub segments: Vec<SegmentScene>,
}

pub(crate) fn build(engine: &Engine) -> SceneDescription {
    let problem = &engine.problem;
    let max_min_sep = problem
        .interactions
        .point_segment_repel
        .min_separation
        .max(problem.interactions.segment_segment_repel.min_separation);

    let bounds = problem.bounds.map(|b| RectScene {
        min_x: b.min_x,
        min_y: b.min_y,
        max_x: b.max_x,
        max_y: b.max_y,
    });
    let effective_bounds = problem.bounds.map(|b| RectScene {
        min_x: b.min_x + b.boundary_padding,
        min_y: b.min_y + b.boundary_padding,
        max_x: b.max_x - b.boundary_padding,
        max_y: b.max_y - b.boundary_padding,
    });

    let points = problem
        .points
        .iter()
        .map(|p| PointScene {
            id: p.id.clone(),
            x: p.x,
            y: p.y,
            radius: p.radius,
            movable: p.movable,
            separation_halo: p.radius + max_min_sep,
        })
        .collect();

    let segments = problem
        .segments
        .iter()
        .filter_map(|s| {
            let a = problem.points.iter().find(|p| p.id == s.a)?;
            let b = problem.points.iter().find(|p| p.id == s.b)?;
            Some(SegmentScene {
                id: s.id.clone(),
                ax: a.x,
                ay: a.y,
                bx: b.x,
                by: b.y,
                half_width: s.width * 0.5,
                buffer_halo: s.width * 0.5 + max_min_sep,
            })
        })
        .collect();

    SceneDescription {
        iterations: engine.iterations,
        bounds,
        effective_bounds,
        points,
        segments,
    }
}

//! Segment-segment repulsion (spec §4.4.2).

use crate::forces::repulsion_magnitude;
use crate::geometry::{closest_points_on_segments, Vec2, EPS};
use crate::grid::Grid;
use crate::problem::RepulsionParams;
use crate::state::CachedState;

pub(crate) fn apply(state: &mut CachedState, grid: &mut Grid, params: &RepulsionParams) {
    for i in 0..state.n_segments() {
        if state.segment_inert(i) {
            continue;
        }
        let neighbors = grid.segments_near_segment(i, state);
        for j in neighbors {
            if state.segment_inert(j) {
                continue;
            }
            let layer_i = state.seg_layer[i];
            let layer_j = state.seg_layer[j];
            if layer_i.is_none() || layer_i != layer_j {
                continue;
            }

            let ai = state.seg_a[i].unwrap();
            let bi = state.seg_b[i].unwrap();
            let aj = state.seg_a[j].unwrap();
            let bj = state.seg_b[j].unwrap();
            if ai == aj || ai == bj || bi == aj || bi == bj {
                continue;
            }
            if !state.movable[ai] && !state.movable[bi] && !state.movable[aj] && !state.movable[bj]
            {
                continue;
            }

            let p1 = state.point_pos(ai);
            let q1 = state.point_pos(bi);
            let p2 = state.point_pos(aj);
            let q2 = state.point_pos(bj);
            let closest = closest_points_on_segments(p1, q1, p2, q2);
            let required = state.seg_half_width[i] + state.seg_half_width[j] + params.min_separation;
            let dist = closest.dist_sq.sqrt();
            let gap = dist - required;
            let mag = repulsion_magnitude(gap, params);
            if !mag.is_finite() {
                continue;
            }

            let dir = if closest.dist_sq > EPS {
                (closest.c1 - closest.c2).normalized_or(Vec2::new(1.0, 0.0))
            } else {
                let mid_i = (p1 + q1) * 0.5;
                let mid_j = (p2 + q2) * 0.5;
                let mid_diff = mid_i - mid_j;
                if mid_diff.len_sq() > EPS {
                    mid_diff.normalized_or(Vec2::new(1.0, 0.0))
                } else {
                    (q1 - p1).left_perp().normalized_or(Vec2::new(1.0, 0.0))
                }
            };

            let f = dir * mag;
            state.add_force(ai, f * (1.0 - closest.s));
            state.add_force(bi, f * closest.s);
            state.add_force(aj, -f * (1.0 - closest.t));
            state.add_force(bj, -f * closest.t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Point, Problem, Segment};

    fn two_crossing_segments(layer_a: &str, layer_b: &str) -> Problem {
        let mut problem = Problem::default();
        problem
            .points
            .push(Point::new("a1", -5.0, 0.0).with_layers([layer_a]));
        problem
            .points
            .push(Point::new("a2", 5.0, 0.0).with_layers([layer_a]));
        problem
            .points
            .push(Point::new("b1", 0.0, -5.0).with_layers([layer_b]));
        problem
            .points
            .push(Point::new("b2", 0.0, 5.0).with_layers([layer_b]));
        problem.segments.push(
            Segment::new("s1", "a1", "a2")
                .with_layer(layer_a)
                .with_width(2.0),
        );
        problem.segments.push(
            Segment::new("s2", "b1", "b2")
                .with_layer(layer_b)
                .with_width(2.0),
        );
        problem.interactions.segment_segment_repel = RepulsionParams {
            strength: 1.0,
            exponential_decay: 0.0,
            overlap_multiplier: 1.0,
            min_separation: 0.0,
        };
        problem
    }

    #[test]
    fn force_is_symmetric_between_segments() {
        let problem = two_crossing_segments("0", "0");
        let mut state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        state.clear_forces();
        apply(&mut state, &mut grid, &problem.interactions.segment_segment_repel);
        let sum_x: f32 = state.fx.iter().sum();
        let sum_y: f32 = state.fy.iter().sum();
        assert!(sum_x.abs() < 1e-3);
        assert!(sum_y.abs() < 1e-3);
    }

    #[test]
    fn different_layers_exert_no_force() {
        let problem = two_crossing_segments("0", "1");
        let mut state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        state.clear_forces();
        apply(&mut state, &mut grid, &problem.interactions.segment_segment_repel);
        for i in 0..state.n_points() {
            assert_eq!(state.fx[i], 0.0);
            assert_eq!(state.fy[i], 0.0);
        }
    }
}

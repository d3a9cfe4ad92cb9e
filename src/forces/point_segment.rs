//! Point-segment repulsion (spec §4.4.3). Points are not inserted into
//! the grid; each point queries the 3x3 cell neighborhood around its own
//! cell.

use crate::forces::repulsion_magnitude;
use crate::geometry::{closest_point_on_segment, Vec2, EPS};
use crate::grid::Grid;
use crate::problem::RepulsionParams;
use crate::state::CachedState;

pub(crate) fn apply(state: &mut CachedState, grid: &mut Grid, params: &RepulsionParams) {
    for p_idx in 0..state.n_points() {
        let p = state.point_pos(p_idx);
        let candidates = grid.segments_near_point(p);
        for s_idx in candidates {
            if state.segment_inert(s_idx) {
                continue;
            }
            let seg_layer = match state.seg_layer[s_idx] {
                Some(l) => l,
                None => continue,
            };
            if !state.point_layers[p_idx].contains(seg_layer) {
                continue;
            }

            let a_idx = state.seg_a[s_idx].unwrap();
            let b_idx = state.seg_b[s_idx].unwrap();
            if p_idx == a_idx || p_idx == b_idx {
                continue;
            }
            if !state.movable[p_idx] && !state.movable[a_idx] && !state.movable[b_idx] {
                continue;
            }

            let a = state.point_pos(a_idx);
            let b = state.point_pos(b_idx);
            let closest = closest_point_on_segment(p, a, b);
            let required = state.radius[p_idx] + state.seg_half_width[s_idx] + params.min_separation;
            let dist = closest.dist_sq.sqrt();
            let gap = dist - required;
            let mag = repulsion_magnitude(gap, params);
            if !mag.is_finite() {
                continue;
            }

            let dir = if closest.dist_sq > EPS {
                closest.delta.normalized_or(Vec2::new(1.0, 0.0))
            } else {
                (b - a).left_perp().normalized_or(Vec2::new(1.0, 0.0))
            };

            let f = dir * mag;
            state.add_force(p_idx, f);
            state.add_force(a_idx, -f * (1.0 - closest.t));
            state.add_force(b_idx, -f * closest.t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Point, Problem, Segment};

    #[test]
    fn point_on_segment_endpoint_excluded() {
        let mut problem = Problem::default();
        problem.points.push(Point::new("a", 0.0, 0.0));
        problem.points.push(Point::new("b", 10.0, 0.0));
        problem.segments.push(Segment::new("s1", "a", "b"));
        problem.interactions.point_segment_repel.strength = 1.0;
        let mut state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        state.clear_forces();
        apply(&mut state, &mut grid, &problem.interactions.point_segment_repel);
        assert_eq!(state.fx[0], 0.0);
        assert_eq!(state.fy[0], 0.0);
    }

    #[test]
    fn force_sums_to_zero_across_pair() {
        let mut problem = Problem::default();
        problem.points.push(Point::new("p", 1.0, 0.1));
        problem.points.push(Point::new("a", 0.0, 0.0));
        problem.points.push(Point::new("b", 10.0, 0.0));
        problem.segments.push(Segment::new("s1", "a", "b").with_width(0.0));
        problem.interactions.point_segment_repel.strength = 1.0;
        problem.interactions.point_segment_repel.min_separation = 5.0;
        let mut state = CachedState::build(&problem);
        let mut grid = Grid::new();
        grid.rebuild(&state);
        state.clear_forces();
        apply(&mut state, &mut grid, &problem.interactions.point_segment_repel);
        let sum_x: f32 = state.fx.iter().sum();
        let sum_y: f32 = state.fy.iter().sum();
        assert!(sum_x.abs() < 1e-3);
        assert!(sum_y.abs() < 1e-3);
    }
}

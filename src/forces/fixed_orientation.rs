//! Fixed-orientation hinge correction (spec §4.4.6).

use crate::forces::correction_gain;
use crate::geometry::{wrap_to_pi, EPS};
use crate::problem::CorrectionParams;
use crate::state::CachedState;

pub(crate) fn apply(state: &mut CachedState, params: &CorrectionParams) {
    for i in 0..state.n_segments() {
        if !state.seg_fixed_orientation[i] {
            continue;
        }
        let (a_idx, b_idx) = match (state.seg_a[i], state.seg_b[i]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        if !state.movable[a_idx] && !state.movable[b_idx] {
            continue;
        }

        let a = state.point_pos(a_idx);
        let b = state.point_pos(b_idx);
        let d = b - a;
        let l = d.len();
        if l <= EPS {
            continue;
        }

        let ang = d.y.atan2(d.x);
        let err = wrap_to_pi(ang - state.seg_rest_angle[i]);
        let gain = correction_gain(err.abs(), params);
        // Length-scaled so longer segments rotate at the same angular rate.
        let mag = params.strength * err * l * gain;
        if !mag.is_finite() {
            continue;
        }

        let u = d * (1.0 / l);
        let n = u.left_perp();
        state.add_force(a_idx, n * mag);
        state.add_force(b_idx, n * -mag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Point, Problem, Segment};

    #[test]
    fn rotated_segment_feels_restoring_couple() {
        let mut problem = Problem::default();
        problem.points.push(Point::new("a", 0.0, 0.0).fixed());
        problem.points.push(Point::new("b", 10.0, 0.0));
        problem
            .segments
            .push(Segment::new("s1", "a", "b").fixed_orientation());
        let mut state = CachedState::build(&problem);
        state.px[1] = 0.0;
        state.py[1] = 10.0;
        state.clear_forces();
        let params = CorrectionParams {
            strength: 1.0,
            exponential_decay: 0.0,
        };
        apply(&mut state, &params);
        assert!(
            state.fx[1] != 0.0 || state.fy[1] != 0.0,
            "rotated hinge should feel a restoring couple"
        );
    }
}

//! Fixed-length spring correction (spec §4.4.5).

use crate::forces::correction_gain;
use crate::geometry::EPS;
use crate::problem::CorrectionParams;
use crate::state::CachedState;

pub(crate) fn apply(state: &mut CachedState, params: &CorrectionParams) {
    for i in 0..state.n_segments() {
        if !state.seg_fixed_length[i] {
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

        let err = l - state.seg_rest_length[i];
        let gain = correction_gain(err.abs(), params);
        let mag = params.strength * err * gain;
        if !mag.is_finite() {
            continue;
        }

        let u = d * (1.0 / l);
        state.add_force(a_idx, u * mag);
        state.add_force(b_idx, u * -mag);
    }
}

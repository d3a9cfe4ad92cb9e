//! Boundary keep-in (spec §4.4.4). Computed for every point, including
//! fixed ones: applying force to a fixed point's slot is a no-op on its
//! position and no downstream kernel reads it (spec §9).

use crate::geometry::{safe_exp, Vec2};
use crate::problem::BoundaryParams;
use crate::state::CachedState;

fn edge_magnitude(gap: f32, params: &BoundaryParams) -> f32 {
    let overlap = if gap < 0.0 { params.overlap_multiplier } else { 1.0 };
    let decay = if params.exponential_decay == 0.0 {
        1.0
    } else {
        safe_exp(-params.exponential_decay * gap)
    };
    overlap * params.strength * decay
}

pub(crate) fn apply(state: &mut CachedState, params: &BoundaryParams) {
    let bounds = match state.bounds {
        Some(b) => b,
        None => return,
    };
    for i in 0..state.n_points() {
        let r = state.radius[i];
        let pad = bounds.boundary_padding;
        let min_x = bounds.min_x + pad + r;
        let max_x = bounds.max_x - pad - r;
        let min_y = bounds.min_y + pad + r;
        let max_y = bounds.max_y - pad - r;

        let x = state.px[i];
        let y = state.py[i];
        let gap_left = x - min_x;
        let gap_right = max_x - x;
        let gap_bottom = y - min_y;
        let gap_top = max_y - y;

        let mut f = Vec2::ZERO;
        f.x += edge_magnitude(gap_left, params);
        f.x -= edge_magnitude(gap_right, params);
        f.y += edge_magnitude(gap_bottom, params);
        f.y -= edge_magnitude(gap_top, params);
        state.add_force(i, f);
    }
}

//! Velocity update with friction/momentum, per-step movement clamp,
//! convergence test, and writeback to the externally owned point objects
//! (spec §4.5).

use crate::geometry::Vec2;
use crate::problem::{Point, Schedule};
use crate::schedule::effective_friction;
use crate::state::CachedState;

pub struct IntegrationResult {
    pub max_move: f32,
}

/// Advances velocities and positions for one step and mirrors the new
/// positions of movable points back into `points` (the caller's owned
/// point objects, spec §5: "the external holder must tolerate in-place
/// mutation").
pub fn integrate(
    state: &mut CachedState,
    points: &mut [Point],
    schedule: &Schedule,
    sigma: f32,
) -> IntegrationResult {
    let phi = effective_friction(schedule.friction, sigma);
    let mu = 1.0 - phi;
    let mut max_move = 0.0f32;

    for i in 0..state.n_points() {
        if !state.movable[i] {
            continue;
        }
        let f = Vec2::new(state.fx[i], state.fy[i]) * sigma;
        let mut v = Vec2::new(state.vx[i], state.vy[i]) * mu + f * schedule.step_size;

        if v.len_sq() <= crate::geometry::EPS {
            state.vx[i] = 0.0;
            state.vy[i] = 0.0;
            continue;
        }

        if let Some(max_per_step) = schedule.max_move_per_step {
            let len = v.len();
            if len > max_per_step {
                v = v * (max_per_step / len);
            }
        }

        state.vx[i] = v.x;
        state.vy[i] = v.y;
        state.px[i] += v.x;
        state.py[i] += v.y;
        points[i].x = state.px[i];
        points[i].y = state.py[i];

        max_move = max_move.max(v.len());
    }

    IntegrationResult { max_move }
}

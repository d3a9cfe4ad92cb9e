//! The five force kernels (spec §4.4), assembled in the fixed order the
//! state machine requires: segment-segment, point-segment, boundary
//! keep-in, fixed-length correction, fixed-orientation correction.

mod boundary;
mod fixed_length;
mod fixed_orientation;
mod point_segment;
mod segment_segment;

use crate::grid::Grid;
use crate::problem::{CorrectionParams, Interactions, RepulsionParams};
use crate::state::CachedState;

/// `gap = distance - required`. Overlap (`gap < 0`) amplifies magnitude
/// both via the overlap multiplier and via the exponent turning positive.
pub(crate) fn repulsion_magnitude(gap: f32, params: &RepulsionParams) -> f32 {
    let overlap = if gap < 0.0 { params.overlap_multiplier } else { 1.0 };
    let decay = if params.exponential_decay == 0.0 {
        1.0
    } else {
        crate::geometry::safe_exp(-params.exponential_decay * gap)
    };
    params.strength * overlap * decay
}

pub(crate) fn correction_gain(err_abs: f32, params: &CorrectionParams) -> f32 {
    if params.exponential_decay == 0.0 {
        1.0
    } else {
        crate::geometry::safe_exp(params.exponential_decay * err_abs)
    }
}

/// Sum of the force buffer's magnitudes, logged at `trace` level after
/// each kernel so a caller tracing this crate can see which interaction
/// family dominates a given step without instrumenting its own copy.
fn total_force_magnitude(state: &CachedState) -> f32 {
    state
        .fx
        .iter()
        .zip(state.fy.iter())
        .map(|(&fx, &fy)| (fx * fx + fy * fy).sqrt())
        .sum()
}

/// Rebuilds the broadphase grid and accumulates every kernel's
/// contribution into `state`'s force buffer. Forces must already be
/// zeroed by the caller (the engine clears them once per step before
/// assembly, per spec §4.4).
pub fn assemble(state: &mut CachedState, grid: &mut Grid, interactions: &Interactions) {
    grid.rebuild(state);

    segment_segment::apply(state, grid, &interactions.segment_segment_repel);
    tracing::trace!(kernel = "segment_segment", total = total_force_magnitude(state));

    point_segment::apply(state, grid, &interactions.point_segment_repel);
    tracing::trace!(kernel = "point_segment", total = total_force_magnitude(state));

    boundary::apply(state, &interactions.bounds_keep_in);
    tracing::trace!(kernel = "boundary", total = total_force_magnitude(state));

    fixed_length::apply(state, &interactions.fixed_length);
    tracing::trace!(kernel = "fixed_length", total = total_force_magnitude(state));

    fixed_orientation::apply(state, &interactions.fixed_orientation);
    tracing::trace!(kernel = "fixed_orientation", total = total_force_magnitude(state));
}

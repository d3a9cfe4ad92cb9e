//! A 2D force-directed relaxation engine over a mixed population of
//! points (degrees of freedom) and segments (derived geometry).
//!
//! Construct a [`Problem`], build an [`Engine`] from it, and call
//! [`Engine::step`] or [`Engine::solve`] until [`Engine::solved`] is true
//! or the driver's own iteration cap is reached. The engine mutates point
//! positions in place; nothing else is observable about it besides the
//! reporting-only [`Engine::visualize`] snapshot.

pub mod engine;
pub mod forces;
pub mod geometry;
pub mod grid;
pub mod integrator;
pub mod layers;
pub mod problem;
pub mod schedule;
pub mod state;
pub mod visualize;

pub use engine::{Engine, SolveReport};
pub use geometry::Vec2;
pub use problem::{
    Bounds, BoundaryParams, CorrectionParams, Interactions, Point, Problem, ProblemBuilder,
    RelaxError, RepulsionParams, Schedule, Segment,
};
pub use visualize::SceneDescription;

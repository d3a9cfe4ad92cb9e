//! Step dispatcher, lazy initialization, and solved/iteration bookkeeping
//! (spec §4.7, §6).

use crate::forces;
use crate::grid::Grid;
use crate::problem::{Problem, RelaxError};
use crate::schedule;
use crate::state::CachedState;
use crate::visualize::{self, SceneDescription};
use crate::{integrator, Point};

/// Snapshot returned by [`Engine::solve`] for caller convenience; the same
/// values remain available afterward via [`Engine::iterations`] etc.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolveReport {
    pub iterations: usize,
    pub solved: bool,
    pub final_progress: f32,
}

/// The relaxation engine. Owns the problem (so point positions mutate in
/// place) and lazily builds its cached flat-array state on the first
/// [`Engine::step`].
pub struct Engine {
    pub(crate) problem: Problem,
    cache: Option<(CachedState, Grid)>,
    pub solved: bool,
    pub iterations: usize,
    pub progress: f32,
    /// Surfaced only for a driver to report failures; the engine itself
    /// never sets this (spec §6).
    pub error: Option<String>,
}

impl Engine {
    /// The only place construction can fail: duplicate ids, inverted
    /// bounds, or a point with no layers (spec §7 ambient policy).
    pub fn new(problem: Problem) -> Result<Engine, RelaxError> {
        problem.validate()?;
        Ok(Engine {
            problem,
            cache: None,
            solved: false,
            iterations: 0,
            progress: 0.0,
            error: None,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.problem.points
    }

    fn ensure_initialized(&mut self) {
        if self.cache.is_none() {
            let state = CachedState::build(&self.problem);
            self.cache = Some((state, Grid::new()));
        }
    }

    /// Advances one iteration. Idempotent once `solved` is true.
    pub fn step(&mut self) {
        if self.solved {
            return;
        }
        self.ensure_initialized();
        let (state, grid) = self.cache.as_mut().expect("initialized above");

        state.clear_forces();
        forces::assemble(state, grid, &self.problem.interactions);

        let sigma = schedule::relaxation_scale(
            self.iterations,
            self.problem.schedule.max_steps,
            self.problem.schedule.relaxation_steps,
        );
        let result = integrator::integrate(state, &mut self.problem.points, &self.problem.schedule, sigma);

        self.iterations += 1;
        let epsilon = self.problem.schedule.epsilon_move;
        self.progress = (epsilon / epsilon.max(result.max_move)).min(1.0);
        if result.max_move <= epsilon {
            self.solved = true;
        }

        tracing::debug!(
            iterations = self.iterations,
            max_move = result.max_move,
            sigma,
            solved = self.solved,
            "relaxation step complete"
        );
    }

    /// Repeats `step` until solved or the iteration cap is reached.
    pub fn solve(&mut self) -> SolveReport {
        while !self.solved && self.iterations < self.problem.schedule.max_steps {
            self.step();
        }
        SolveReport {
            iterations: self.iterations,
            solved: self.solved,
            final_progress: self.progress,
        }
    }

    /// A reporting-only snapshot: the initial problem before any step has
    /// run, or the current state thereafter. Never mutates the engine.
    pub fn visualize(&self) -> SceneDescription {
        visualize::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Bounds, Point as P, Schedule, Segment};

    #[test]
    fn step_after_solved_is_a_no_op() {
        let mut problem = Problem::default();
        problem.points.push(P::new("a", 0.0, 0.0));
        problem.schedule = Schedule {
            max_steps: 50,
            step_size: 0.1,
            epsilon_move: 0.01,
            max_move_per_step: None,
            friction: 1.0,
            relaxation_steps: 0,
        };
        let mut engine = Engine::new(problem).unwrap();
        engine.solve();
        assert!(engine.solved);
        let iterations_before = engine.iterations;
        let pos_before = (engine.problem.points[0].x, engine.problem.points[0].y);
        engine.step();
        assert_eq!(engine.iterations, iterations_before);
        assert_eq!(
            (engine.problem.points[0].x, engine.problem.points[0].y),
            pos_before
        );
        assert!(engine.solved);
    }

    #[test]
    fn no_interactions_leaves_positions_unchanged() {
        let mut problem = Problem::default();
        problem.points.push(P::new("a", 1.0, 2.0));
        problem.points.push(P::new("b", 3.0, 4.0));
        problem.segments.push(Segment::new("s1", "a", "b"));
        problem.bounds = Some(Bounds::new(-1000.0, -1000.0, 1000.0, 1000.0));
        problem.schedule.max_steps = 20;
        let mut engine = Engine::new(problem).unwrap();
        for _ in 0..20 {
            engine.step();
        }
        assert_eq!(engine.problem.points[0].x, 1.0);
        assert_eq!(engine.problem.points[0].y, 2.0);
        assert_eq!(engine.problem.points[1].x, 3.0);
        assert_eq!(engine.problem.points[1].y, 4.0);
    }

    #[test]
    fn visualize_before_stepping_describes_initial_problem() {
        let mut problem = Problem::default();
        problem.points.push(P::new("a", 5.0, 5.0));
        problem.bounds = Some(Bounds::new(0.0, 0.0, 10.0, 10.0));
        let engine = Engine::new(problem).unwrap();
        let scene = engine.visualize();
        assert_eq!(scene.iterations, 0);
        assert_eq!(scene.points[0].x, 5.0);
        assert!(scene.bounds.is_some());
    }
}

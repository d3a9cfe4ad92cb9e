//! The declarative problem description: geometry, interaction parameters,
//! and the solve schedule. This is the only configuration surface the
//! engine accepts (spec §6) — no environment variables, no files, no
//! sockets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point of mass in the system; the only degree of freedom the engine
/// integrates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_true")]
    pub movable: bool,
    #[serde(default)]
    pub radius: f32,
    pub layers: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Point {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Point {
        Point {
            id: id.into(),
            x,
            y,
            movable: true,
            radius: 0.0,
            layers: vec!["default".to_string()],
        }
    }

    pub fn fixed(mut self) -> Point {
        self.movable = false;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Point {
        self.radius = radius;
        self
    }

    pub fn with_layers<I, S>(mut self, layers: I) -> Point
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }
}

/// A line segment whose geometry is always derived from its two endpoints;
/// it carries no position of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub a: String,
    pub b: String,
    #[serde(default = "default_width")]
    pub width: f32,
    pub layer: String,
    #[serde(default)]
    pub fixed_length: bool,
    #[serde(default)]
    pub fixed_orientation: bool,
    /// Overrides the rest length that would otherwise be captured from
    /// the endpoints' positions at lazy init. Lets a caller author a rest
    /// geometry and then start the simulation from a perturbed position
    /// (e.g. a layout editor where the user just dragged an endpoint away
    /// from its settled spot) without the perturbation itself becoming
    /// the new rest state.
    #[serde(default)]
    pub rest_length: Option<f32>,
    /// Same override for `fixedOrientation`, see `rest_length`.
    #[serde(default)]
    pub rest_angle: Option<f32>,
}

fn default_width() -> f32 {
    1.0
}

impl Segment {
    pub fn new(id: impl Into<String>, a: impl Into<String>, b: impl Into<String>) -> Segment {
        Segment {
            id: id.into(),
            a: a.into(),
            b: b.into(),
            width: 1.0,
            layer: "default".to_string(),
            fixed_length: false,
            fixed_orientation: false,
            rest_length: None,
            rest_angle: None,
        }
    }

    pub fn with_width(mut self, width: f32) -> Segment {
        self.width = width;
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Segment {
        self.layer = layer.into();
        self
    }

    pub fn fixed_length(mut self) -> Segment {
        self.fixed_length = true;
        self
    }

    pub fn with_rest_length(mut self, rest_length: f32) -> Segment {
        self.rest_length = Some(rest_length);
        self
    }

    pub fn with_rest_angle(mut self, rest_angle: f32) -> Segment {
        self.rest_angle = Some(rest_angle);
        self
    }

    pub fn fixed_orientation(mut self) -> Segment {
        self.fixed_orientation = true;
        self
    }
}

/// Axis-aligned keep-in region.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    #[serde(default)]
    pub boundary_padding: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Bounds {
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
            boundary_padding: 0.0,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Bounds {
        self.boundary_padding = padding;
        self
    }
}

/// Base magnitude / decay / overlap multiplier shared by every repulsion
/// and boundary interaction family.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct RepulsionParams {
    #[serde(default)]
    pub strength: f32,
    #[serde(default)]
    pub exponential_decay: f32,
    #[serde(default = "default_one")]
    pub overlap_multiplier: f32,
    #[serde(default)]
    pub min_separation: f32,
}

fn default_one() -> f32 {
    1.0
}

impl Default for RepulsionParams {
    fn default() -> RepulsionParams {
        RepulsionParams {
            strength: 0.0,
            exponential_decay: 0.0,
            overlap_multiplier: 1.0,
            min_separation: 0.0,
        }
    }
}

/// Boundary keep-in has no extra clearance term, otherwise the same shape
/// as [`RepulsionParams`].
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct BoundaryParams {
    #[serde(default)]
    pub strength: f32,
    #[serde(default)]
    pub exponential_decay: f32,
    #[serde(default = "default_one")]
    pub overlap_multiplier: f32,
}

impl Default for BoundaryParams {
    fn default() -> BoundaryParams {
        BoundaryParams {
            strength: 0.0,
            exponential_decay: 0.0,
            overlap_multiplier: 1.0,
        }
    }
}

/// Fixed-length / fixed-orientation correction parameters.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionParams {
    #[serde(default)]
    pub strength: f32,
    #[serde(default)]
    pub exponential_decay: f32,
}

impl Default for CorrectionParams {
    fn default() -> CorrectionParams {
        CorrectionParams {
            strength: 0.0,
            exponential_decay: 0.0,
        }
    }
}

/// All interaction family parameters in one record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Interactions {
    #[serde(default)]
    pub segment_segment_repel: RepulsionParams,
    #[serde(default)]
    pub point_segment_repel: RepulsionParams,
    #[serde(default)]
    pub bounds_keep_in: BoundaryParams,
    #[serde(default)]
    pub fixed_length: CorrectionParams,
    #[serde(default)]
    pub fixed_orientation: CorrectionParams,
}

/// Iteration budget, numeric integration parameters, and the end-of-run
/// relaxation fade.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Schedule {
    pub max_steps: usize,
    pub step_size: f32,
    pub epsilon_move: f32,
    #[serde(default)]
    pub max_move_per_step: Option<f32>,
    #[serde(default = "default_one")]
    pub friction: f32,
    #[serde(default)]
    pub relaxation_steps: usize,
}

impl Default for Schedule {
    fn default() -> Schedule {
        Schedule {
            max_steps: 300,
            step_size: 0.1,
            epsilon_move: 1e-3,
            max_move_per_step: None,
            friction: 1.0,
            relaxation_steps: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum RelaxError {
    #[error("duplicate point id: {0}")]
    DuplicatePoint(String),
    #[error("duplicate segment id: {0}")]
    DuplicateSegment(String),
    #[error("bounds has min > max: ({min_x}, {min_y}) .. ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },
    #[error("point {0} has no layers")]
    PointHasNoLayers(String),
}

/// The full declarative problem description. Supplied once at
/// construction; points and segments are owned here, mutated in place by
/// the engine as it integrates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Problem {
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub interactions: Interactions,
    pub schedule: Schedule,
}

impl Problem {
    /// Checks the faults that are legitimate to reject eagerly, at
    /// construction time, per spec §7's "unresolved endpoint" and
    /// "unknown layer" policies: unresolved endpoints and unknown layers
    /// are *not* errors (they degrade gracefully at step time), but
    /// duplicate ids and an inverted bounds rectangle are caller mistakes
    /// worth catching before any stepping happens.
    pub fn validate(&self) -> Result<(), RelaxError> {
        let mut seen_points = std::collections::HashSet::new();
        for p in &self.points {
            if !seen_points.insert(p.id.as_str()) {
                return Err(RelaxError::DuplicatePoint(p.id.clone()));
            }
            if p.layers.is_empty() {
                return Err(RelaxError::PointHasNoLayers(p.id.clone()));
            }
        }
        let mut seen_segments = std::collections::HashSet::new();
        for s in &self.segments {
            if !seen_segments.insert(s.id.as_str()) {
                return Err(RelaxError::DuplicateSegment(s.id.clone()));
            }
        }
        if let Some(b) = self.bounds {
            if b.min_x > b.max_x || b.min_y > b.max_y {
                return Err(RelaxError::InvalidBounds {
                    min_x: b.min_x,
                    min_y: b.min_y,
                    max_x: b.max_x,
                    max_y: b.max_y,
                });
            }
        }
        Ok(())
    }
}

/// Ergonomic incremental assembly of a [`Problem`], mirroring the
/// accessor-driven constructors the force kernels in the wider ecosystem
/// expose (e.g. `CollideForce::new_with_accessor`).
#[derive(Clone, Debug, Default)]
pub struct ProblemBuilder {
    problem: Problem,
}

impl ProblemBuilder {
    pub fn new() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn point(mut self, point: Point) -> ProblemBuilder {
        self.problem.points.push(point);
        self
    }

    pub fn segment(mut self, segment: Segment) -> ProblemBuilder {
        self.problem.segments.push(segment);
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> ProblemBuilder {
        self.problem.bounds = Some(bounds);
        self
    }

    pub fn interactions(mut self, interactions: Interactions) -> ProblemBuilder {
        self.problem.interactions = interactions;
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> ProblemBuilder {
        self.problem.schedule = schedule;
        self
    }

    pub fn build(self) -> Result<Problem, RelaxError> {
        self.problem.validate()?;
        Ok(self.problem)
    }
}

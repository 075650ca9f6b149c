//! Cushion Sim - event-driven elastic collisions in a rectangular arena
//!
//! Instead of stepping time in fixed increments, the simulation jumps
//! directly from one collision instant to the next, producing an exact,
//! replayable log of state changes.
//!
//! Core modules:
//! - `sim`: Bodies, collision algebra, event index and the simulation driver
//! - `settings`: Tunable defaults (mass, chunk duration)
//! - `error`: Construction and configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;
pub use sim::{
    Arena, Body, BodyId, BodySnapshot, BodySpec, Event, EventKind, FinishReason, ReplayChunk,
    ReplayRecord, RunState, Scenario, Simulation, Vector2D, Wall, simulate,
};

/// Simulation constants
pub mod consts {
    /// Mass given to bodies that don't specify one
    pub const DEFAULT_MASS: f64 = 100.0;
    /// Smallest time delta treated as "in the future"
    pub const TIME_EPSILON: f64 = f64::EPSILON;
    /// Default length of a streamed chunk (time units)
    pub const DEFAULT_CHUNK_DURATION: f64 = 10_000.0;

    /// Reference billiard table (millimetres), used by the benchmark
    pub const TABLE_WIDTH: f64 = 2840.0;
    pub const TABLE_HEIGHT: f64 = 1420.0;
    pub const BALL_RADIUS: f64 = 37.5;
}

/// Total kinetic energy of a set of bodies
#[inline]
pub fn total_kinetic_energy<'a>(bodies: impl IntoIterator<Item = &'a Body>) -> f64 {
    bodies.into_iter().map(Body::kinetic_energy).sum()
}

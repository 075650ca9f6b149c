//! Event-driven simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - No fixed timestep: time advances from one collision to the next
//! - Stable iteration order (bodies in construction order)
//! - Ties between simultaneous events broken by insertion order
//! - No rendering or platform dependencies

pub mod arena;
pub mod body;
pub mod collision;
pub mod driver;
pub mod queue;
pub mod replay;

pub use arena::{Arena, Wall};
pub use body::{Body, BodyId, BodySet, BodySpec, Vector2D};
pub use collision::{
    Event, earliest_event, pair_collision, resolve_pair, resolve_wall, wall_collision,
};
pub use driver::{FinishReason, RunState, Scenario, Simulation, simulate};
pub use queue::EventIndex;
pub use replay::{BodySnapshot, EventKind, ReplayChunk, ReplayRecord, replay_to_json};

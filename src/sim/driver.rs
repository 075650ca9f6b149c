//! Simulation driver
//!
//! Repeatedly pops the earliest event, advances only the bodies it
//! references, resolves the physics and re-derives their events. A run can
//! be resumed for further chunks; the carried state is exactly the bodies,
//! the event index and the current time.

use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::body::{Body, BodyId, BodySet, BodySpec, Vector2D};
use super::collision::{Event, resolve_pair, resolve_wall};
use super::queue::EventIndex;
use super::replay::{ReplayChunk, ReplayRecord};
use crate::error::{SimError, SimResult};
use crate::settings::Settings;

/// Why the last run call stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// The next pending event lies beyond the requested horizon
    HorizonReached,
    /// No body will ever collide again under current trajectories
    NoMoreEvents,
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Resolving events toward a horizon
    Running,
    /// The last run call has returned
    Finished(FinishReason),
}

/// Complete construction input: arena plus initial bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub width: f64,
    pub height: f64,
    pub bodies: Vec<BodySpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn arena(&self) -> SimResult<Arena> {
        Arena::new(self.width, self.height)
    }
}

/// An event-driven simulation run
#[derive(Debug, Clone)]
pub struct Simulation {
    arena: Arena,
    bodies: BodySet,
    index: EventIndex,
    /// Current simulation time
    time: f64,
    state: RunState,
    settings: Settings,
    events_resolved: u64,
    /// Whether the time-0 snapshot has been handed out
    snapshot_emitted: bool,
}

impl Simulation {
    /// Validate the bodies and build the initial event index
    pub fn new(arena: Arena, specs: &[BodySpec], settings: &Settings) -> SimResult<Self> {
        let bodies = BodySet::build(&arena, specs, settings.default_mass)?;
        let index = EventIndex::initialize(arena, &bodies);

        log::info!(
            "Simulation created: {} bodies in {}x{} arena, {} pending events",
            bodies.len(),
            arena.width,
            arena.height,
            index.len()
        );

        Ok(Self {
            arena,
            bodies,
            index,
            time: 0.0,
            state: RunState::Running,
            settings: settings.clone(),
            events_resolved: 0,
            snapshot_emitted: false,
        })
    }

    pub fn from_scenario(scenario: &Scenario, settings: &Settings) -> SimResult<Self> {
        Self::new(scenario.arena()?, &scenario.bodies, settings)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Bodies in construction order, each valid at its own `local_time`
    pub fn bodies(&self) -> &[Body] {
        self.bodies.as_slice()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn events_resolved(&self) -> u64 {
        self.events_resolved
    }

    pub fn pending_events(&self) -> usize {
        self.index.len()
    }

    /// The event that will be resolved next
    pub fn next_event(&self) -> Option<&Event> {
        self.index.peek()
    }

    pub fn kinetic_energy(&self) -> f64 {
        crate::total_kinetic_energy(self.bodies.iter())
    }

    pub fn momentum(&self) -> Vector2D {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Every body's centre extrapolated to absolute time `t`
    pub fn positions_at(&self, t: f64) -> Vec<(BodyId, Vector2D)> {
        self.bodies.iter().map(|b| (b.id, b.position_at(t))).collect()
    }

    /// Full-state record of every body as currently stored
    pub fn snapshot(&self) -> ReplayRecord {
        ReplayRecord::state_update(self.time, self.bodies.iter())
    }

    /// Run for `duration` more time units
    ///
    /// The first call returns the initial snapshot as its first record.
    pub fn simulate(&mut self, duration: f64) -> SimResult<Vec<ReplayRecord>> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(SimError::InvalidDuration(duration));
        }
        self.run_until(self.time + duration)
    }

    /// Resolve every event up to and including absolute time `horizon`
    ///
    /// Events past the horizon stay pending for the next call, and the clock
    /// is left at the horizon.
    pub fn run_until(&mut self, horizon: f64) -> SimResult<Vec<ReplayRecord>> {
        if !horizon.is_finite() || horizon < self.time {
            return Err(SimError::InvalidDuration(horizon - self.time));
        }

        let mut records = Vec::new();
        if !self.snapshot_emitted {
            records.push(self.snapshot());
            self.snapshot_emitted = true;
        }

        self.state = RunState::Running;
        let started = self.events_resolved;

        while self.state == RunState::Running {
            match self.index.peek().map(Event::time) {
                None => {
                    self.time = horizon;
                    self.state = RunState::Finished(FinishReason::NoMoreEvents);
                }
                Some(t) if t > horizon => {
                    self.time = horizon;
                    self.state = RunState::Finished(FinishReason::HorizonReached);
                }
                Some(_) => records.extend(self.step()),
            }
        }

        log::info!(
            "Simulated to t={:.3}: {} events resolved ({:?})",
            self.time,
            self.events_resolved - started,
            self.state
        );

        Ok(records)
    }

    /// Simulate one chunk of `settings.chunk_duration`
    pub fn next_chunk(&mut self) -> SimResult<ReplayChunk> {
        let records = self.simulate(self.settings.chunk_duration)?;
        Ok(ReplayChunk::from_records(records))
    }

    /// Resolve the single earliest event, ignoring any horizon
    pub fn step(&mut self) -> Option<ReplayRecord> {
        let event = self.index.pop_earliest()?;
        let time = event.time();

        for id in event.bodies() {
            if let Some(body) = self.bodies.get_mut(id) {
                body.advance_to(time);
            }
        }

        match event {
            Event::Wall { body, wall, .. } => {
                if let Some(body) = self.bodies.get_mut(body) {
                    resolve_wall(body, wall, &self.arena);
                }
            }
            Event::Pair { a, b, .. } => {
                if let Some((a, b)) = self.bodies.pair_mut(a, b) {
                    resolve_pair(a, b);
                }
            }
        }

        let ids: Vec<BodyId> = event.bodies().collect();
        let record =
            ReplayRecord::from_event(&event, ids.iter().filter_map(|&id| self.bodies.get(id)));
        self.index.recompute(&self.bodies, &ids);

        self.time = self.time.max(time);
        self.events_resolved += 1;
        log::trace!("t={:.6} resolved {:?}", time, event);

        Some(record)
    }
}

/// One-shot run: build a simulation and resolve everything up to `horizon`
pub fn simulate(
    arena: Arena,
    specs: &[BodySpec],
    horizon: f64,
    settings: &Settings,
) -> SimResult<Vec<ReplayRecord>> {
    let mut sim = Simulation::new(arena, specs, settings)?;
    sim.run_until(horizon)
}

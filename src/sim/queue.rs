//! Event index
//!
//! Holds the live set of predicted events, ordered by absolute time, along
//! with a reverse index from each body to the events that reference it.
//!
//! Invariant: every live event was computed from the *current* state of all
//! the bodies it references. Popping an event drops every other event that
//! touches its participants, and `recompute` re-derives theirs afterwards.
//!
//! Ties on time are broken by insertion order, so runs are reproducible.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};

use super::arena::Arena;
use super::body::{Body, BodyId, BodySet};
use super::collision::{Event, pair_collision, wall_collision};

/// Ordering key: absolute time, then insertion sequence
#[derive(Debug, Clone, Copy)]
struct EventKey {
    time: f64,
    seq: u64,
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.time.to_bits().hash(state);
        self.seq.hash(state);
    }
}

/// Priority structure of pending events with per-body invalidation
#[derive(Debug, Clone)]
pub struct EventIndex {
    arena: Arena,
    queue: BTreeMap<EventKey, Event>,
    by_body: HashMap<BodyId, HashSet<EventKey>>,
    next_seq: u64,
}

impl EventIndex {
    /// Empty index for the given arena
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            queue: BTreeMap::new(),
            by_body: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Build the index from scratch: every wall event and every pair event
    pub fn initialize(arena: Arena, bodies: &BodySet) -> Self {
        let mut index = Self::new(arena);
        let all = bodies.as_slice();
        for (i, a) in all.iter().enumerate() {
            index.insert_wall_event(a);
            for b in &all[i + 1..] {
                index.insert_pair_event(a, b);
            }
        }
        log::debug!(
            "Event index initialized: {} bodies, {} events",
            bodies.len(),
            index.len()
        );
        index
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Earliest pending event without removing it
    pub fn peek(&self) -> Option<&Event> {
        self.queue.first_key_value().map(|(_, event)| event)
    }

    /// Number of live events referencing `id`
    pub fn events_for(&self, id: BodyId) -> usize {
        self.by_body.get(&id).map_or(0, HashSet::len)
    }

    /// All live events in time order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.values()
    }

    /// Remove and return the earliest event
    ///
    /// Every other event referencing one of its bodies is discarded as well,
    /// since those were computed from velocities that are about to change.
    pub fn pop_earliest(&mut self) -> Option<Event> {
        let (key, event) = self.queue.pop_first()?;
        self.unlink(key, &event);

        for id in event.bodies() {
            let Some(keys) = self.by_body.remove(&id) else {
                continue;
            };
            for stale_key in keys {
                if let Some(stale) = self.queue.remove(&stale_key) {
                    self.unlink(stale_key, &stale);
                }
            }
        }

        Some(event)
    }

    /// Re-derive the events of the given bodies from their current state
    ///
    /// Each body gets its wall event and a pair event against every other
    /// body. A pair made of two recomputed bodies is inserted once.
    pub fn recompute(&mut self, bodies: &BodySet, ids: &[BodyId]) {
        for (n, &id) in ids.iter().enumerate() {
            let Some(body) = bodies.get(id) else {
                log::warn!("Recompute requested for unknown body {}", id);
                continue;
            };
            self.insert_wall_event(body);

            for other in bodies.iter() {
                if other.id == id || ids[..n].contains(&other.id) {
                    continue;
                }
                self.insert_pair_event(body, other);
            }
        }
    }

    fn insert_wall_event(&mut self, body: &Body) {
        if let Some((wall, time)) = wall_collision(body, &self.arena) {
            self.insert(Event::Wall {
                body: body.id,
                wall,
                time,
            });
        }
    }

    fn insert_pair_event(&mut self, a: &Body, b: &Body) {
        if let Some(time) = pair_collision(a, b) {
            self.insert(Event::Pair {
                a: a.id,
                b: b.id,
                time,
            });
        }
    }

    fn insert(&mut self, event: Event) {
        let key = EventKey {
            time: event.time(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        for id in event.bodies() {
            self.by_body.entry(id).or_default().insert(key);
        }
        self.queue.insert(key, event);
    }

    /// Drop `key` from the reverse index of every body `event` references
    fn unlink(&mut self, key: EventKey, event: &Event) {
        for id in event.bodies() {
            if let Some(keys) = self.by_body.get_mut(&id) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.by_body.remove(&id);
                }
            }
        }
    }
}

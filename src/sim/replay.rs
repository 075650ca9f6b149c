//! Replay log records
//!
//! The ordered output of a run: one full snapshot at time 0, then one record
//! per resolved event carrying only the bodies that changed. Records are
//! immutable once emitted. Field names are the wire format consumed by
//! external renderers.

use serde::{Deserialize, Serialize};

use super::arena::Wall;
use super::body::{Body, BodyId, Vector2D};
use super::collision::Event;
use crate::error::SimResult;

/// What produced a replay record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Full-state snapshot (emitted once, at the start)
    StateUpdate,
    WallCollision,
    BodyCollision,
}

/// State of one body at the moment a record was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
    pub local_time: f64,
}

impl From<&Body> for BodySnapshot {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            position: body.position,
            velocity: body.velocity,
            radius: body.radius,
            local_time: body.local_time,
        }
    }
}

/// One entry of the replay log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Absolute timestamp
    pub time: f64,
    pub kind: EventKind,
    /// Struck wall, for wall collisions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall: Option<Wall>,
    pub bodies: Vec<BodySnapshot>,
}

impl ReplayRecord {
    /// Full snapshot of every body
    pub fn state_update<'a>(time: f64, bodies: impl IntoIterator<Item = &'a Body>) -> Self {
        Self {
            time,
            kind: EventKind::StateUpdate,
            wall: None,
            bodies: bodies.into_iter().map(BodySnapshot::from).collect(),
        }
    }

    /// Record for a resolved event; `bodies` are its participants after resolution
    pub fn from_event<'a>(event: &Event, bodies: impl IntoIterator<Item = &'a Body>) -> Self {
        let (kind, wall) = match *event {
            Event::Wall { wall, .. } => (EventKind::WallCollision, Some(wall)),
            Event::Pair { .. } => (EventKind::BodyCollision, None),
        };
        Self {
            time: event.time(),
            kind,
            wall,
            bodies: bodies.into_iter().map(BodySnapshot::from).collect(),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A bounded slice of the replay log, as handed to a streaming consumer
///
/// `initial_values` is present only in the first chunk of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_values: Option<ReplayRecord>,
    pub data: Vec<ReplayRecord>,
}

impl ReplayChunk {
    /// Split a record list, pulling a leading snapshot into `initial_values`
    pub fn from_records(mut records: Vec<ReplayRecord>) -> Self {
        let initial_values = match records.first() {
            Some(first) if first.kind == EventKind::StateUpdate => Some(records.remove(0)),
            _ => None,
        };
        Self {
            initial_values,
            data: records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.initial_values.is_none() && self.data.is_empty()
    }
}

/// Serialize a whole replay log as a JSON array
pub fn replay_to_json(records: &[ReplayRecord]) -> SimResult<String> {
    Ok(serde_json::to_string(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(id: u32) -> Body {
        let mut body = Body::new(
            BodyId(id),
            Vector2D::new(1.5, 2.0),
            Vector2D::new(-0.5, 0.25),
            1.0,
            10.0,
        );
        body.local_time = 3.0;
        body
    }

    #[test]
    fn test_wall_record_wire_format() {
        let b = body(7);
        let event = Event::Wall {
            body: b.id,
            wall: Wall::East,
            time: 3.0,
        };
        let record = ReplayRecord::from_event(&event, [&b]);
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

        assert_eq!(value["time"], 3.0);
        assert_eq!(value["kind"], "WALL_COLLISION");
        assert_eq!(value["wall"], "EAST");
        assert_eq!(value["bodies"][0]["id"], 7);
        assert_eq!(value["bodies"][0]["localTime"], 3.0);
        assert_eq!(value["bodies"][0]["position"][0], 1.5);
        assert_eq!(value["bodies"][0]["velocity"][1], 0.25);
    }

    #[test]
    fn test_pair_record_omits_wall() {
        let (a, b) = (body(1), body(2));
        let event = Event::Pair {
            a: a.id,
            b: b.id,
            time: 3.0,
        };
        let record = ReplayRecord::from_event(&event, [&a, &b]);
        assert_eq!(record.kind, EventKind::BodyCollision);
        assert_eq!(record.bodies.len(), 2);

        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["kind"], "BODY_COLLISION");
        assert!(value.get("wall").is_none());
    }

    #[test]
    fn test_chunk_splits_initial_snapshot() {
        let bodies = [body(1), body(2)];
        let initial = ReplayRecord::state_update(0.0, &bodies);
        let event = ReplayRecord::from_event(
            &Event::Wall {
                body: BodyId(1),
                wall: Wall::North,
                time: 3.0,
            },
            [&bodies[0]],
        );

        let chunk = ReplayChunk::from_records(vec![initial.clone(), event.clone()]);
        assert_eq!(chunk.initial_values, Some(initial));
        assert_eq!(chunk.data, vec![event.clone()]);

        let chunk = ReplayChunk::from_records(vec![event]);
        assert!(chunk.initial_values.is_none());
        assert_eq!(chunk.data.len(), 1);

        let json = serde_json::to_string(&ReplayChunk::default()).unwrap();
        assert_eq!(json, r#"{"data":[]}"#);
    }

    #[test]
    fn test_replay_log_json_parses_back() {
        let bodies = [body(1)];
        let records = vec![ReplayRecord::state_update(0.0, &bodies)];
        let json = replay_to_json(&records).unwrap();
        let parsed: Vec<ReplayRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
        assert_eq!(parsed[0].kind, EventKind::StateUpdate);
    }
}

//! Bodies and their kinematic state
//!
//! Every body carries its own clock (`local_time`). Its `position` is only
//! valid at that instant; anything else is extrapolated on demand.

use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use crate::error::{SimError, SimResult};

/// Two-dimensional vector (positions, velocities)
pub type Vector2D = DVec2;

/// Stable body identity, never reused within a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Construction input for a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    /// Explicit id; assigned automatically when absent
    #[serde(default)]
    pub id: Option<BodyId>,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
    /// Falls back to `Settings::default_mass`
    #[serde(default)]
    pub mass: Option<f64>,
}

impl BodySpec {
    pub fn new(position: Vector2D, velocity: Vector2D, radius: f64) -> Self {
        Self {
            id: None,
            position,
            velocity,
            radius,
            mass: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(BodyId(id));
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }
}

/// A circular rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    /// Centre at `local_time`
    pub position: Vector2D,
    /// Constant until the next event touching this body
    pub velocity: Vector2D,
    pub radius: f64,
    pub mass: f64,
    /// Absolute time up to which `position` is valid
    pub local_time: f64,
}

impl Body {
    /// Create a body at `local_time = 0`
    pub fn new(id: BodyId, position: Vector2D, velocity: Vector2D, radius: f64, mass: f64) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            mass,
            local_time: 0.0,
        }
    }

    /// Extrapolate the centre to absolute time `t`
    #[inline]
    pub fn position_at(&self, t: f64) -> Vector2D {
        self.position + self.velocity * (t - self.local_time)
    }

    /// Move the body along its trajectory to absolute time `t`
    pub fn advance_to(&mut self, t: f64) {
        self.position = self.position_at(t);
        self.local_time = t;
    }

    pub fn momentum(&self) -> Vector2D {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

/// The bodies of one simulation, in construction order, addressable by id
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    bodies: Vec<Body>,
    slots: HashMap<BodyId, usize>,
}

impl BodySet {
    /// Validate specs against the arena and build the body set
    ///
    /// Missing ids are filled with the smallest unused ids, counting from 1.
    pub fn build(arena: &Arena, specs: &[BodySpec], default_mass: f64) -> SimResult<Self> {
        let mut taken = HashSet::new();
        for id in specs.iter().filter_map(|s| s.id) {
            if !taken.insert(id) {
                return Err(SimError::DuplicateId(id));
            }
        }

        let mut next_id = 1u32;
        let mut bodies = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = match spec.id {
                Some(id) => id,
                None => {
                    while taken.contains(&BodyId(next_id)) {
                        next_id += 1;
                    }
                    taken.insert(BodyId(next_id));
                    BodyId(next_id)
                }
            };
            let mass = spec.mass.unwrap_or(default_mass);
            let body = Body::new(id, spec.position, spec.velocity, spec.radius, mass);
            validate_body(arena, &body)?;
            bodies.push(body);
        }

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if a.position.distance(b.position) < a.radius + b.radius {
                    return Err(SimError::Overlap { a: a.id, b: b.id });
                }
            }
        }

        let slots = bodies.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
        Ok(Self { bodies, slots })
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(&id).map(|&i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get(&id).map(|&i| &mut self.bodies[i])
    }

    /// Mutable access to two distinct bodies at once
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        let (ia, ib) = (*self.slots.get(&a)?, *self.slots.get(&b)?);
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (lo, hi) = self.bodies.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.bodies.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }
}

fn validate_body(arena: &Arena, body: &Body) -> SimResult<()> {
    let id = body.id;
    if !body.radius.is_finite() || body.radius <= 0.0 {
        return Err(SimError::InvalidRadius {
            id,
            radius: body.radius,
        });
    }
    if !body.mass.is_finite() || body.mass <= 0.0 {
        return Err(SimError::InvalidMass {
            id,
            mass: body.mass,
        });
    }
    if !body.position.is_finite() || !body.velocity.is_finite() {
        return Err(SimError::NonFiniteState { id });
    }
    if !arena.fits(body.radius) {
        return Err(SimError::BodyTooLarge {
            id,
            radius: body.radius,
        });
    }
    if !arena.contains(body.position.x, body.position.y, body.radius) {
        return Err(SimError::OutOfBounds { id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(20.0, 10.0).unwrap()
    }

    #[test]
    fn test_position_at_uses_local_clock() {
        let mut body = Body::new(
            BodyId(1),
            Vector2D::new(2.0, 3.0),
            Vector2D::new(1.0, -0.5),
            1.0,
            1.0,
        );
        body.local_time = 4.0;
        let p = body.position_at(6.0);
        assert!((p.x - 4.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_advance_to() {
        let mut body = Body::new(
            BodyId(1),
            Vector2D::new(2.0, 3.0),
            Vector2D::new(1.0, 1.0),
            1.0,
            1.0,
        );
        body.advance_to(2.0);
        assert_eq!(body.local_time, 2.0);
        assert!((body.position - Vector2D::new(4.0, 5.0)).length() < 1e-12);
        assert_eq!(body.velocity, Vector2D::new(1.0, 1.0));
    }

    #[test]
    fn test_energy_and_momentum() {
        let body = Body::new(BodyId(1), Vector2D::ZERO, Vector2D::new(3.0, 4.0), 1.0, 2.0);
        assert!((body.kinetic_energy() - 25.0).abs() < 1e-12);
        assert_eq!(body.momentum(), Vector2D::new(6.0, 8.0));
    }

    #[test]
    fn test_build_assigns_ids_and_mass() {
        let specs = vec![
            BodySpec::new(Vector2D::new(3.0, 3.0), Vector2D::ZERO, 1.0),
            BodySpec::new(Vector2D::new(6.0, 3.0), Vector2D::ZERO, 1.0).with_id(1),
            BodySpec::new(Vector2D::new(9.0, 3.0), Vector2D::ZERO, 1.0).with_mass(5.0),
        ];
        let set = BodySet::build(&arena(), &specs, 100.0).unwrap();
        let ids: Vec<u32> = set.iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(set.get(BodyId(2)).unwrap().mass, 100.0);
        assert_eq!(set.get(BodyId(3)).unwrap().mass, 5.0);
        assert!(set.iter().all(|b| b.local_time == 0.0));
    }

    #[test]
    fn test_build_rejects_invalid_geometry() {
        let build = |spec: BodySpec| BodySet::build(&arena(), &[spec], 1.0);

        let err = build(BodySpec::new(Vector2D::new(5.0, 5.0), Vector2D::ZERO, 0.0));
        assert!(matches!(err, Err(SimError::InvalidRadius { .. })));

        let err = build(BodySpec::new(Vector2D::new(5.0, 5.0), Vector2D::ZERO, 1.0).with_mass(-1.0));
        assert!(matches!(err, Err(SimError::InvalidMass { .. })));

        let err = build(BodySpec::new(Vector2D::new(10.0, 5.0), Vector2D::ZERO, 6.0));
        assert!(matches!(err, Err(SimError::BodyTooLarge { .. })));

        let err = build(BodySpec::new(Vector2D::new(0.5, 5.0), Vector2D::ZERO, 1.0));
        assert!(matches!(err, Err(SimError::OutOfBounds { .. })));

        let err = build(BodySpec::new(Vector2D::new(5.0, 5.0), Vector2D::new(f64::NAN, 0.0), 1.0));
        assert!(matches!(err, Err(SimError::NonFiniteState { .. })));
    }

    #[test]
    fn test_build_rejects_overlap_and_duplicates() {
        let overlapping = vec![
            BodySpec::new(Vector2D::new(5.0, 5.0), Vector2D::ZERO, 1.0),
            BodySpec::new(Vector2D::new(6.5, 5.0), Vector2D::ZERO, 1.0),
        ];
        assert!(matches!(
            BodySet::build(&arena(), &overlapping, 1.0),
            Err(SimError::Overlap { .. })
        ));

        // Exactly touching is allowed
        let touching = vec![
            BodySpec::new(Vector2D::new(5.0, 5.0), Vector2D::ZERO, 1.0),
            BodySpec::new(Vector2D::new(7.0, 5.0), Vector2D::ZERO, 1.0),
        ];
        assert!(BodySet::build(&arena(), &touching, 1.0).is_ok());

        let duplicates = vec![
            BodySpec::new(Vector2D::new(3.0, 5.0), Vector2D::ZERO, 1.0).with_id(4),
            BodySpec::new(Vector2D::new(9.0, 5.0), Vector2D::ZERO, 1.0).with_id(4),
        ];
        assert!(matches!(
            BodySet::build(&arena(), &duplicates, 1.0),
            Err(SimError::DuplicateId(BodyId(4)))
        ));
    }

    #[test]
    fn test_pair_mut() {
        let specs = vec![
            BodySpec::new(Vector2D::new(3.0, 3.0), Vector2D::ZERO, 1.0),
            BodySpec::new(Vector2D::new(9.0, 3.0), Vector2D::ZERO, 1.0),
        ];
        let mut set = BodySet::build(&arena(), &specs, 1.0).unwrap();
        let (b, a) = set.pair_mut(BodyId(2), BodyId(1)).unwrap();
        assert_eq!(a.id, BodyId(1));
        assert_eq!(b.id, BodyId(2));
        assert!(set.pair_mut(BodyId(1), BodyId(1)).is_none());
        assert!(set.pair_mut(BodyId(1), BodyId(9)).is_none());
    }
}

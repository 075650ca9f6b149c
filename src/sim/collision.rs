//! Collision algebra and response
//!
//! Closed-form time-of-impact for a body against the four walls and for a
//! pair of bodies, plus the physical resolution applied when an event fires.
//! All prediction functions are pure: identical inputs give identical output.

use super::arena::{Arena, Wall};
use super::body::{Body, BodyId, Vector2D};
use crate::consts::TIME_EPSILON;

/// A predicted collision at an absolute time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// `body` reaches `wall`
    Wall { body: BodyId, wall: Wall, time: f64 },
    /// Bodies `a` and `b` touch
    Pair { a: BodyId, b: BodyId, time: f64 },
}

impl Event {
    /// Absolute event time
    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            Event::Wall { time, .. } | Event::Pair { time, .. } => time,
        }
    }

    /// Bodies referenced by this event (one for walls, two for pairs)
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + use<> {
        let (first, second) = match *self {
            Event::Wall { body, .. } => (body, None),
            Event::Pair { a, b, .. } => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }

    /// Whether `id` participates in this event
    pub fn involves(&self, id: BodyId) -> bool {
        match *self {
            Event::Wall { body, .. } => body == id,
            Event::Pair { a, b, .. } => a == id || b == id,
        }
    }
}

#[inline]
fn is_future(dt: f64) -> bool {
    dt > TIME_EPSILON && dt.is_finite()
}

/// Earliest wall the body will reach under its current velocity
///
/// Candidates must lie strictly more than epsilon in the future, so the wall
/// a body just bounced off is never reported again. A zero velocity
/// component makes the corresponding walls unreachable. Returns the wall and
/// the absolute event time.
pub fn wall_collision(body: &Body, arena: &Arena) -> Option<(Wall, f64)> {
    let mut earliest: Option<(Wall, f64)> = None;

    for wall in Wall::ALL {
        let contact = arena.contact_coordinate(wall, body.radius);
        let dt = if wall.is_horizontal() {
            (contact - body.position.y) / body.velocity.y
        } else {
            (contact - body.position.x) / body.velocity.x
        };

        if is_future(dt) && earliest.is_none_or(|(_, best)| dt < best) {
            earliest = Some((wall, dt));
        }
    }

    earliest.map(|(wall, dt)| (wall, dt + body.local_time))
}

/// Absolute time at which two bodies first touch, if ever
///
/// Both bodies are compared at the later of their two clocks. Bodies that are
/// already touching or interpenetrating at that instant never produce an
/// event, which keeps a just-resolved pair from being detected again.
pub fn pair_collision(a: &Body, b: &Body) -> Option<f64> {
    let t0 = a.local_time.max(b.local_time);

    let p = a.position_at(t0) - b.position_at(t0);
    let v = a.velocity - b.velocity;
    let r = a.radius + b.radius;

    if p.length() <= r {
        return None;
    }

    // |p + v t|^2 = r^2  =>  qa t^2 + qb t + qc = 0
    let qa = v.dot(v);
    if qa <= TIME_EPSILON {
        return None;
    }
    let qb = 2.0 * p.dot(v);
    let qc = p.dot(p) - r * r;

    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-qb - sqrt_d) / (2.0 * qa);
    let t2 = (-qb + sqrt_d) / (2.0 * qa);

    [t1, t2]
        .into_iter()
        .filter(|&t| is_future(t))
        .min_by(f64::total_cmp)
        .map(|t| t + t0)
}

/// Reflect a body off `wall` and snap it exactly onto the contact line
///
/// The body must already be advanced to the event time. Snapping discards the
/// extrapolated coordinate so rounding error cannot accumulate over many
/// bounces.
pub fn resolve_wall(body: &mut Body, wall: Wall, arena: &Arena) {
    let contact = arena.contact_coordinate(wall, body.radius);
    if wall.is_horizontal() {
        body.velocity.y = -body.velocity.y;
        body.position.y = contact;
    } else {
        body.velocity.x = -body.velocity.x;
        body.position.x = contact;
    }
}

/// Elastic collision between two bodies with unequal masses
///
/// Only the velocity components along the centre-to-centre normal change;
/// tangential components pass through untouched. Both bodies must already be
/// advanced to the event time.
pub fn resolve_pair(a: &mut Body, b: &mut Body) {
    let delta = a.position - b.position;
    let dist = delta.length();
    if dist <= TIME_EPSILON {
        log::warn!(
            "Bodies {} and {} have coincident centres, skipping response",
            a.id,
            b.id
        );
        return;
    }
    let normal = delta / dist;

    let (va, vb) = (a.velocity.dot(normal), b.velocity.dot(normal));
    let (ma, mb) = (a.mass, b.mass);

    // 1-D elastic collision along the normal
    let common = 2.0 * (ma * va + mb * vb) / (ma + mb);
    let va_after = common - va;
    let vb_after = common - vb;

    a.velocity += normal * (va_after - va);
    b.velocity += normal * (vb_after - vb);
}

/// Earliest event across all bodies by exhaustive scan
///
/// O(n²) in the number of bodies. This is the reference the event index is
/// checked against; ties keep the first candidate found.
pub fn earliest_event(arena: &Arena, bodies: &[Body]) -> Option<Event> {
    let mut earliest: Option<Event> = None;
    let mut consider = |event: Event| {
        if earliest.is_none_or(|best| event.time() < best.time()) {
            earliest = Some(event);
        }
    };

    for (i, a) in bodies.iter().enumerate() {
        if let Some((wall, time)) = wall_collision(a, arena) {
            consider(Event::Wall {
                body: a.id,
                wall,
                time,
            });
        }
        for b in &bodies[i + 1..] {
            if let Some(time) = pair_collision(a, b) {
                consider(Event::Pair {
                    a: a.id,
                    b: b.id,
                    time,
                });
            }
        }
    }

    earliest
}

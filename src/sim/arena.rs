//! Rectangular arena geometry
//!
//! The arena spans `[0, width] x [0, height]` with y pointing north.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One of the four cushions bounding the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Wall {
    /// `y = height`
    North,
    /// `x = width`
    East,
    /// `y = 0`
    South,
    /// `x = 0`
    West,
}

impl Wall {
    /// All walls, in the order candidates are evaluated
    pub const ALL: [Wall; 4] = [Wall::North, Wall::East, Wall::South, Wall::West];

    /// True for the walls perpendicular to the y axis
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Wall::North | Wall::South)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Wall::North => "NORTH",
            Wall::East => "EAST",
            Wall::South => "SOUTH",
            Wall::West => "WEST",
        }
    }
}

/// The rectangular playing field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    /// Create an arena, rejecting non-finite or non-positive dimensions
    pub fn new(width: f64, height: f64) -> SimResult<Self> {
        let valid = |d: f64| d.is_finite() && d > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SimError::InvalidArena { width, height });
        }
        Ok(Self { width, height })
    }

    /// Coordinate of a body centre touching `wall`, along the wall's normal axis
    #[inline]
    pub fn contact_coordinate(&self, wall: Wall, radius: f64) -> f64 {
        match wall {
            Wall::North => self.height - radius,
            Wall::East => self.width - radius,
            Wall::South | Wall::West => radius,
        }
    }

    /// Whether a circle of `radius` fits between opposite walls
    #[inline]
    pub fn fits(&self, radius: f64) -> bool {
        2.0 * radius <= self.width && 2.0 * radius <= self.height
    }

    /// Whether a centre lies within `[radius, dimension - radius]` on both axes
    pub fn contains(&self, x: f64, y: f64, radius: f64) -> bool {
        x >= radius && x <= self.width - radius && y >= radius && y <= self.height - radius
    }
}

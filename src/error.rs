//! Error types for simulation construction and configuration.

use thiserror::Error;

use crate::sim::BodyId;

/// Errors raised while building or driving a simulation.
///
/// Degenerate motion (parallel to a wall, zero relative speed) is never an
/// error; the collision algebra reports it as "no event".
#[derive(Debug, Error)]
pub enum SimError {
    /// Arena dimensions must be finite and positive
    #[error("invalid arena dimensions: {width} x {height}")]
    InvalidArena { width: f64, height: f64 },

    /// Radius must be finite and positive
    #[error("body {id}: invalid radius {radius}")]
    InvalidRadius { id: BodyId, radius: f64 },

    /// Mass must be finite and positive
    #[error("body {id}: invalid mass {mass}")]
    InvalidMass { id: BodyId, mass: f64 },

    /// Position or velocity contains NaN or infinity
    #[error("body {id}: non-finite position or velocity")]
    NonFiniteState { id: BodyId },

    /// Body diameter exceeds an arena extent
    #[error("body {id}: radius {radius} does not fit inside the arena")]
    BodyTooLarge { id: BodyId, radius: f64 },

    /// Body centre lies outside `[radius, dimension - radius]`
    #[error("body {id}: initial position is outside the arena")]
    OutOfBounds { id: BodyId },

    /// Two bodies interpenetrate at construction
    #[error("bodies {a} and {b} overlap")]
    Overlap { a: BodyId, b: BodyId },

    /// The same id was given to more than one body
    #[error("duplicate body id {0}")]
    DuplicateId(BodyId),

    /// Run durations must be finite and non-negative
    #[error("invalid duration: {0}")]
    InvalidDuration(f64),

    /// Settings or scenario JSON could not be parsed or written
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for simulation operations.
pub type SimResult<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::Overlap {
            a: BodyId(1),
            b: BodyId(7),
        };
        assert_eq!(format!("{err}"), "bodies 1 and 7 overlap");

        let err = SimError::InvalidDuration(-2.5);
        assert!(format!("{err}").contains("-2.5"));
    }

    #[test]
    fn test_config_error_from_json() {
        let parse = serde_json::from_str::<f64>("not json");
        let err: SimError = parse.unwrap_err().into();
        assert!(matches!(err, SimError::Config(_)));
    }
}

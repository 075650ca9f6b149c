//! Simulation settings
//!
//! Defaults that apply across runs. Loaded from and saved to JSON.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CHUNK_DURATION, DEFAULT_MASS};
use crate::error::SimResult;

/// Simulation settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mass applied to bodies constructed without an explicit mass
    pub default_mass: f64,
    /// Duration simulated by each `Simulation::next_chunk` call
    pub chunk_duration: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_mass: DEFAULT_MASS,
            chunk_duration: DEFAULT_CHUNK_DURATION,
        }
    }
}

impl Settings {
    /// Settings with a custom chunk duration
    pub fn with_chunk_duration(chunk_duration: f64) -> Self {
        Self {
            chunk_duration,
            ..Default::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

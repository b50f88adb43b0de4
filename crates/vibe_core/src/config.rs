//! Solver Configuration
//!
//! Timing constants of the host game. The defaults match the shipped game and
//! should only be changed when analysing modded or custom rule sets.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// Active time granted by a single charge (seconds)
pub const DEFAULT_CHARGE_SECONDS: f64 = 5.0;

/// Half-width of the real-time window the host accepts around a hit (seconds)
pub const DEFAULT_HIT_WINDOW_SECONDS: f64 = 0.175;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Active time per charge (default: 5.0)
    #[serde(default = "default_charge_seconds")]
    pub charge_seconds: f64,
    /// Acceptance half-window around a hit (default: 0.175)
    #[serde(default = "default_hit_window_seconds")]
    pub hit_window_seconds: f64,
}

fn default_charge_seconds() -> f64 {
    DEFAULT_CHARGE_SECONDS
}

fn default_hit_window_seconds() -> f64 {
    DEFAULT_HIT_WINDOW_SECONDS
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            charge_seconds: DEFAULT_CHARGE_SECONDS,
            hit_window_seconds: DEFAULT_HIT_WINDOW_SECONDS,
        }
    }
}

impl SolverConfig {
    /// Pool cap: active time never exceeds two charges' worth.
    pub fn max_active_seconds(&self) -> f64 {
        2.0 * self.charge_seconds
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.charge_seconds.is_finite() || self.charge_seconds <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "charge_seconds must be positive and finite, got {}",
                self.charge_seconds
            )));
        }
        if !self.hit_window_seconds.is_finite() || self.hit_window_seconds < 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "hit_window_seconds must be non-negative and finite, got {}",
                self.hit_window_seconds
            )));
        }
        Ok(())
    }
}

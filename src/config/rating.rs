//! Rating system configuration

use serde::{Deserialize, Serialize};

/// Parameters of the Elo forward pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating every fighter starts from on first appearance
    pub starting_rating: f64,
    /// Sensitivity of a single outcome
    pub k_factor: f64,
    /// Number of recent rating changes kept per fighter
    pub recent_window: usize,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            starting_rating: 1200.0,
            k_factor: 32.0,
            recent_window: 5,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.starting_rating.is_finite() {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "Starting rating must be finite".to_string(),
            }
            .into());
        }

        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        if self.recent_window > 100 {
            return Err(crate::error::RatingError::ConfigurationError {
                message: "Recent window cannot exceed 100 fights".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

//! Elo rating arithmetic
//!
//! This module wraps the expected-score function of the skillratings crate
//! and turns a bout result into a pair of rating deltas.

use crate::config::RatingConfig;
use crate::types::ResultKind;
use serde::{Deserialize, Serialize};
use skillratings::elo::{expected_score, EloRating};

/// Rating changes produced by one bout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoutDeltas {
    pub loser: f64,
    pub winner: f64,
}

/// Elo calculator with a fixed K-factor
#[derive(Debug, Clone, Copy)]
pub struct EloCalculator {
    k_factor: f64,
}

impl EloCalculator {
    pub fn new(k_factor: f64) -> Self {
        Self { k_factor }
    }

    pub fn from_config(config: &RatingConfig) -> Self {
        Self::new(config.k_factor)
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }

    /// Expected scores as (loser, winner); they always sum to 1
    ///
    /// Equivalent to `10^(r/400)` strengths normalised over both sides.
    pub fn expected_scores(&self, loser_rating: f64, winner_rating: f64) -> (f64, f64) {
        expected_score(
            &EloRating {
                rating: loser_rating,
            },
            &EloRating {
                rating: winner_rating,
            },
        )
    }

    /// Deltas for both sides, computed from their pre-bout ratings
    pub fn rating_deltas(
        &self,
        loser_rating: f64,
        winner_rating: f64,
        kind: ResultKind,
    ) -> BoutDeltas {
        let (expected_loser, expected_winner) = self.expected_scores(loser_rating, winner_rating);
        let (actual_loser, actual_winner) = kind.scores();

        BoutDeltas {
            loser: self.k_factor * (actual_loser - expected_loser),
            winner: self.k_factor * (actual_winner - expected_winner),
        }
    }
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self::from_config(&RatingConfig::default())
    }
}

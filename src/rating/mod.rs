//! Elo rating engine
//!
//! This module runs the single forward pass over the fight history and
//! exposes the resulting standings, using the Elo expected-score function
//! from the skillratings crate.

pub mod elo;
pub mod engine;
pub mod record;
pub mod standings;

// Re-export commonly used types
pub use elo::{BoutDeltas, EloCalculator};
pub use engine::RatingEngine;
pub use record::{FighterRecord, RecentDeltas};
pub use standings::{RankedFighter, RankingKey, Standings};

//! UFC Elo - fight history rating engine
//!
//! This crate replays a chronological record of UFC bouts through an Elo
//! rating model, keeps the record current from a results provider, and
//! renders ranked tables of the fighters.

pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod rating;
pub mod report;
pub mod service;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use fetch::{EventSource, UfcStatsSource};
pub use history::{History, HistoryStore};
pub use rating::{RatingEngine, Standings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

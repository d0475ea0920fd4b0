//! Fight history persistence
//!
//! This module loads the chronological outcome sequence from the CSV history
//! file and appends newly fetched events to it.

pub mod record;
pub mod store;

// Re-export commonly used types
pub use store::{EventSummary, History, HistoryStore, LoadReport};

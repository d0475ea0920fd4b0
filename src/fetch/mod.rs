//! Remote event fetching
//!
//! This module pulls completed events from the results site and merges the
//! unseen ones into the fight history.

pub mod source;
pub mod sync;
pub mod ufcstats;

// Re-export commonly used types
pub use source::EventSource;
pub use sync::{sync_new_events, SyncReport};
pub use ufcstats::{UfcStatsParser, UfcStatsSource};

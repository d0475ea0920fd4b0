//! Event source interface
//!
//! This module defines the interface for pulling completed events from a
//! remote results provider.

use crate::error::Result;
use crate::types::{EventId, EventResults};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Trait for providers of completed event results
#[async_trait]
pub trait EventSource: Send + Sync {
    /// List every completed event, most recent first
    async fn list_events(&self) -> Result<Vec<EventId>>;

    /// Fetch the results of one event
    ///
    /// # Returns
    /// `None` when the event has not happened yet or carries no results
    async fn fetch_event(&self, event_id: &str) -> Result<Option<EventResults>>;

    /// Pause to observe between consecutive event requests
    fn request_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Events not present in `known`, most recent first
    async fn list_new_events(&self, known: &HashSet<EventId>) -> Result<Vec<EventId>> {
        let mut seen = HashSet::new();
        Ok(self
            .list_events()
            .await?
            .into_iter()
            .filter(|id| !known.contains(id) && seen.insert(id.clone()))
            .collect())
    }
}

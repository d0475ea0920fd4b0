//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use ufc_elo::error::Result;
use ufc_elo::fetch::EventSource;
use ufc_elo::types::{Bout, EventId, EventResults, ResultKind};

/// What the mock source answers for one event
#[derive(Debug, Clone)]
pub enum EventReply {
    Results(EventResults),
    NotYetHeld,
    Failure(String),
}

/// Mock event source that serves canned events and records requests
#[derive(Debug, Default)]
pub struct MockEventSource {
    listing: Vec<EventId>,
    replies: HashMap<EventId, EventReply>,
    listing_fails: bool,
    requested: Arc<Mutex<Vec<EventId>>>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose event listing always fails
    pub fn unreachable() -> Self {
        Self {
            listing_fails: true,
            ..Self::default()
        }
    }

    /// Add an event to the front of the listing, as the newest event
    pub fn with_event(mut self, event_id: &str, reply: EventReply) -> Self {
        self.listing.insert(0, event_id.to_string());
        self.replies.insert(event_id.to_string(), reply);
        self
    }

    /// Event ids fetched so far, in request order
    pub fn requested(&self) -> Vec<EventId> {
        self.requested
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn list_events(&self) -> Result<Vec<EventId>> {
        if self.listing_fails {
            anyhow::bail!("connection refused");
        }
        Ok(self.listing.clone())
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Option<EventResults>> {
        if let Ok(mut ids) = self.requested.lock() {
            ids.push(event_id.to_string());
        }

        match self.replies.get(event_id) {
            Some(EventReply::Results(results)) => Ok(Some(results.clone())),
            Some(EventReply::NotYetHeld) | None => Ok(None),
            Some(EventReply::Failure(reason)) => anyhow::bail!("{}", reason),
        }
    }
}

/// Build an event from (loser, winner, kind) triples
pub fn event(event_id: &str, year: i32, bouts: &[(&str, &str, ResultKind)]) -> EventResults {
    EventResults {
        event_id: event_id.to_string(),
        event_year: year,
        bouts: bouts
            .iter()
            .map(|(loser, winner, kind)| Bout::new(*loser, *winner, *kind))
            .collect(),
    }
}

/// Write history rows to a temporary CSV file
pub fn history_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

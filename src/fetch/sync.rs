//! Merge newly completed events into the fight history
//!
//! Events are fetched oldest first and appended in that order. A failure for
//! one event is logged and skipped; a failure to list events means no new data.

use crate::error::RatingError;
use crate::fetch::source::EventSource;
use crate::history::HistoryStore;
use crate::types::{EventId, EventResults};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

/// Outcome of one synchronisation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Events the source reported that were not recorded yet
    pub new_events: usize,
    /// Events appended to the history
    pub appended_events: usize,
    /// Outcomes appended to the history
    pub appended_outcomes: usize,
    /// Events without results yet
    pub pending: Vec<EventId>,
    /// Events whose fetch or validation failed
    pub failed: Vec<EventId>,
    /// Whether the appended events reached the history file
    pub persisted: bool,
}

/// Fetch every unseen event and append it to the store
pub async fn sync_new_events(source: &dyn EventSource, store: &mut HistoryStore) -> SyncReport {
    let mut report = SyncReport {
        persisted: true,
        ..SyncReport::default()
    };

    info!("Checking for new events...");
    let known = store.known_event_identifiers();
    let mut new_events = match source.list_new_events(&known).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Could not list events, continuing with recorded history: {:#}", e);
            return report;
        }
    };

    if new_events.is_empty() {
        info!("No new events found. History is up to date.");
        return report;
    }

    // The source lists the most recent event first
    new_events.reverse();
    report.new_events = new_events.len();
    info!("Found {} new events. Fetching...", new_events.len());

    let mut fetched = Vec::new();
    for (i, event_id) in new_events.iter().enumerate() {
        if i > 0 {
            sleep(source.request_delay()).await;
        }

        match source.fetch_event(event_id).await {
            Ok(Some(results)) => match validate_event(event_id, &results) {
                Ok(()) => fetched.push(results),
                Err(e) => {
                    warn!("Skipping event: {}", e);
                    report.failed.push(event_id.clone());
                }
            },
            Ok(None) => {
                info!("Event {} has no results yet", event_id);
                report.pending.push(event_id.clone());
            }
            Err(e) => {
                warn!("Skipping event {}: {:#}", event_id, e);
                report.failed.push(event_id.clone());
            }
        }
    }

    report.appended_events = fetched.len();
    match store.append(&fetched) {
        Ok(count) => report.appended_outcomes = count,
        Err(e) => {
            report.appended_outcomes = fetched.iter().map(|event| event.bouts.len()).sum();
            report.persisted = false;
            warn!("New events are rated but were not saved: {:#}", e);
        }
    }

    info!(
        "Fetching complete: {} events added, {} pending, {} failed",
        report.appended_events,
        report.pending.len(),
        report.failed.len()
    );
    report
}

/// Reject results that cannot be rated or belong to another event
pub fn validate_event(requested: &str, event: &EventResults) -> Result<(), RatingError> {
    let failure = |reason: String| RatingError::FetchFailure {
        event_id: requested.to_string(),
        reason,
    };

    if event.event_id != requested {
        return Err(failure(format!(
            "source answered with event {}",
            event.event_id
        )));
    }
    if event.bouts.is_empty() {
        return Err(failure("event has no bouts".to_string()));
    }

    for (i, bout) in event.bouts.iter().enumerate() {
        if bout.loser.trim().is_empty() || bout.winner.trim().is_empty() {
            return Err(failure(format!("bout {} has an empty fighter name", i + 1)));
        }
        if bout.loser == bout.winner {
            return Err(failure(format!(
                "bout {} lists {} on both sides",
                i + 1,
                bout.loser
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bout, ResultKind};

    fn event(bouts: Vec<Bout>) -> EventResults {
        EventResults {
            event_id: "e1".to_string(),
            event_year: 2024,
            bouts,
        }
    }

    #[test]
    fn test_validate_event() {
        assert!(validate_event("e1", &event(vec![Bout::new("A", "B", ResultKind::Win)])).is_ok());
        assert!(validate_event("e1", &event(vec![])).is_err());
        assert!(validate_event("e1", &event(vec![Bout::new("", "B", ResultKind::Win)])).is_err());
        assert!(validate_event("e1", &event(vec![Bout::new("A", "A", ResultKind::Draw)])).is_err());
    }

    #[test]
    fn test_validate_event_rejects_other_event_id() {
        let err = validate_event("e2", &event(vec![Bout::new("A", "B", ResultKind::Win)]))
            .unwrap_err();

        match err {
            RatingError::FetchFailure { event_id, reason } => {
                assert_eq!(event_id, "e2");
                assert!(reason.contains("e1"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}

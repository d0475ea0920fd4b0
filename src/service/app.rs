//! Main application state and run coordination
//!
//! This module wires the history store, the optional event source and the
//! rating engine into a single run.

use crate::config::{validate_config, AppConfig};
use crate::error::Result;
use crate::fetch::{sync_new_events, EventSource, SyncReport, UfcStatsSource};
use crate::history::{HistoryStore, LoadReport};
use crate::rating::{RatingEngine, Standings};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// What happened during one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Rows read from the history file and rows skipped as malformed
    pub load: LoadReport,
    /// Result of synchronising with the event source, if it ran
    pub sync: Option<SyncReport>,
    /// Distinct events the rated outcomes belong to
    pub events_rated: usize,
    /// Outcomes fed to the engine
    pub outcomes_rated: usize,
    /// Fighters with a record
    pub fighters: usize,
}

/// Main application state
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Fight history, loaded once at startup
    store: HistoryStore,

    /// Provider of new events, absent when running offline
    source: Option<Box<dyn EventSource>>,
}

impl AppState {
    /// Validate the configuration, load the history and build the event source
    pub fn new(config: AppConfig) -> Result<Self> {
        validate_config(&config)?;

        info!("Loading fight history from {}", config.store.path.display());
        let store = HistoryStore::open_or_empty(&config.store.path, config.store.strict)?;

        let source: Option<Box<dyn EventSource>> = if config.fetch.enabled {
            Some(Box::new(UfcStatsSource::new(&config)?))
        } else {
            info!("Fetching disabled, rating recorded history only");
            None
        };

        Ok(Self::with_parts(config, store, source))
    }

    /// Assemble state from already constructed components
    pub fn with_parts(
        config: AppConfig,
        store: HistoryStore,
        source: Option<Box<dyn EventSource>>,
    ) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Get application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the history store
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Synchronise new events, then replay the full history
    pub async fn run(&mut self) -> Result<(Standings, RunSummary)> {
        let start_time = Instant::now();
        let mut summary = RunSummary {
            load: self.store.load_report().clone(),
            ..RunSummary::default()
        };

        if summary.load.skipped > 0 {
            warn!(
                "{} malformed history rows were skipped",
                summary.load.skipped
            );
        }

        if let Some(source) = self.source.as_deref() {
            let report = sync_new_events(source, &mut self.store).await;
            summary.sync = Some(report);
        }

        let history = self.store.history();
        summary.events_rated = history.event_ids().len();
        match history.events().last() {
            Some(latest) => info!(
                "History covers {} events, latest {} ({})",
                summary.events_rated, latest.event_id, latest.event_year
            ),
            None => warn!("Fight history is empty, nothing to rate"),
        }

        info!("Calculating Elo ratings for {} bouts...", history.len());
        let standings = RatingEngine::compute(self.config.rating, history.outcomes())?;

        summary.outcomes_rated = history.len();
        summary.fighters = standings.len();

        info!(
            "Rated {} fighters from {} bouts in {:.2}ms",
            summary.fighters,
            summary.outcomes_rated,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok((standings, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::types::{EventId, EventResults, Outcome, ResultKind};
    use async_trait::async_trait;

    struct OneEvent;

    #[async_trait]
    impl EventSource for OneEvent {
        async fn list_events(&self) -> Result<Vec<EventId>> {
            Ok(vec!["new".to_string(), "old".to_string()])
        }

        async fn fetch_event(&self, event_id: &str) -> Result<Option<EventResults>> {
            Ok(Some(EventResults {
                event_id: event_id.to_string(),
                event_year: 2024,
                bouts: vec![crate::types::Bout::new("C", "A", ResultKind::Win)],
            }))
        }
    }

    fn recorded() -> HistoryStore {
        HistoryStore::in_memory(History::from_outcomes(vec![Outcome::new(
            "B",
            "A",
            ResultKind::Win,
            "old",
            2023,
        )]))
    }

    #[tokio::test]
    async fn test_events_counted_once_when_rows_are_split() {
        let history = History::from_outcomes(vec![
            Outcome::new("B", "A", ResultKind::Win, "e1", 2023),
            Outcome::new("D", "C", ResultKind::Win, "e2", 2023),
            Outcome::new("F", "E", ResultKind::Win, "e1", 2023),
        ]);
        let mut state =
            AppState::with_parts(AppConfig::default(), HistoryStore::in_memory(history), None);
        let (_, summary) = state.run().await.unwrap();

        assert_eq!(summary.events_rated, 2);
        assert_eq!(summary.outcomes_rated, 3);
    }

    #[tokio::test]
    async fn test_offline_run_rates_recorded_history() {
        let mut state = AppState::with_parts(AppConfig::default(), recorded(), None);
        let (standings, summary) = state.run().await.unwrap();

        assert!(summary.sync.is_none());
        assert_eq!(summary.outcomes_rated, 1);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings.get("A").unwrap().rating, 1216.0);
    }

    #[tokio::test]
    async fn test_run_includes_synced_events() {
        let mut state =
            AppState::with_parts(AppConfig::default(), recorded(), Some(Box::new(OneEvent)));
        let (standings, summary) = state.run().await.unwrap();

        let sync = summary.sync.unwrap();
        assert_eq!(sync.new_events, 1);
        assert_eq!(sync.appended_outcomes, 1);
        assert_eq!(summary.outcomes_rated, 2);
        assert_eq!(summary.events_rated, 2);
        assert_eq!(standings.get("A").unwrap().wins, 2);
        assert_eq!(state.store().history().len(), 2);
    }
}

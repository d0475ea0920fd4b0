//! Fight history store
//!
//! Holds the chronological outcome sequence and, when bound to a file,
//! persists new events by appending rows. Existing rows are never rewritten.

use crate::error::{RatingError, Result};
use crate::history::record::{self, HistoryRow};
use crate::types::{EventId, EventResults, EventYear, Outcome};
use anyhow::anyhow;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters collected while loading a history source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Rows decoded into outcomes
    pub loaded: usize,
    /// Rows rejected as malformed or with an unknown result kind
    pub skipped: usize,
}

/// Consecutive outcomes belonging to one event
#[derive(Debug, Clone, Copy)]
pub struct EventSummary<'a> {
    pub event_id: &'a str,
    pub event_year: EventYear,
    pub outcomes: &'a [Outcome],
}

/// Ordered outcome sequence, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    outcomes: Vec<Outcome>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already ordered outcome list
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    /// Parse persisted rows, preserving their order
    ///
    /// Blank rows are skipped. Bad rows are logged and skipped unless
    /// `strict` is set, in which case the first one fails the load.
    pub fn from_reader<R: Read>(reader: R, strict: bool) -> Result<(Self, LoadReport)> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut outcomes = Vec::new();
        let mut report = LoadReport::default();

        for (index, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    if let csv::ErrorKind::Io(io_err) = e.kind() {
                        return Err(anyhow!("Failed to read fight history: {}", io_err));
                    }
                    let line = e.position().map(|p| p.line()).unwrap_or(index as u64 + 1);
                    let err = RatingError::MalformedRecord {
                        line,
                        reason: e.to_string(),
                    };
                    if strict {
                        return Err(err.into());
                    }
                    warn!("Skipping history row: {}", err);
                    report.skipped += 1;
                    continue;
                }
            };

            if record::is_blank(&row) {
                continue;
            }

            let line = row.position().map(|p| p.line()).unwrap_or(index as u64 + 1);
            match record::decode(&row, line) {
                Ok(outcome) => {
                    outcomes.push(outcome);
                    report.loaded += 1;
                }
                Err(err) if strict => return Err(err.into()),
                Err(err) => {
                    warn!("Skipping history row: {}", err);
                    report.skipped += 1;
                }
            }
        }

        Ok((Self { outcomes }, report))
    }

    /// All outcomes in chronological order
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Group consecutive outcomes that share an event identifier
    pub fn events(&self) -> impl Iterator<Item = EventSummary<'_>> {
        self.outcomes
            .chunk_by(|a, b| a.event_id == b.event_id)
            .map(|outcomes| EventSummary {
                event_id: &outcomes[0].event_id,
                event_year: outcomes[0].event_year,
                outcomes,
            })
    }

    /// Identifiers of every event present in the history
    pub fn event_ids(&self) -> HashSet<EventId> {
        self.outcomes.iter().map(|o| o.event_id.clone()).collect()
    }

    fn push_event(&mut self, event: &EventResults) {
        self.outcomes.extend(event.outcomes());
    }
}

/// Fight history bound to an optional CSV file
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    history: History,
    report: LoadReport,
}

impl HistoryStore {
    /// Store that lives only in memory
    pub fn in_memory(history: History) -> Self {
        Self {
            path: None,
            history,
            report: LoadReport::default(),
        }
    }

    /// Load the history file at `path`
    pub fn open(path: &Path, strict: bool) -> Result<Self> {
        let file = File::open(path).map_err(|e| RatingError::StoreUnavailable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let (history, report) = History::from_reader(io::BufReader::new(file), strict)?;
        info!(
            "Loaded {} outcomes from {} ({} rows skipped)",
            report.loaded,
            path.display(),
            report.skipped
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            history,
            report,
        })
    }

    /// Load the history file, starting empty if it cannot be opened
    ///
    /// The returned store stays bound to `path` so appended events create it.
    pub fn open_or_empty(path: &Path, strict: bool) -> Result<Self> {
        match Self::open(path, strict) {
            Ok(store) => Ok(store),
            Err(e) => match e.downcast_ref::<RatingError>() {
                Some(RatingError::StoreUnavailable { .. }) => {
                    warn!("{}. Starting with an empty history.", e);
                    Ok(Self {
                        path: Some(path.to_path_buf()),
                        history: History::new(),
                        report: LoadReport::default(),
                    })
                }
                _ => Err(e),
            },
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Identifiers of events already recorded
    pub fn known_event_identifiers(&self) -> HashSet<EventId> {
        self.history.event_ids()
    }

    /// Append events in the given order and persist them
    ///
    /// The in-memory sequence is extended first. A persistence failure is
    /// returned as `StoreUnavailable`; the file is truncated back to its
    /// previous length so it never keeps part of the batch.
    pub fn append(&mut self, events: &[EventResults]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        for event in events {
            self.history.push_event(event);
        }
        let added: usize = events.iter().map(|e| e.bouts.len()).sum();

        if let Some(path) = &self.path {
            persist(path, events).map_err(|e| RatingError::StoreUnavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            debug!("Appended {} rows to {}", added, path.display());
        }

        Ok(added)
    }
}

fn persist(path: &Path, events: &[EventResults]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for event in events {
        for outcome in event.outcomes() {
            writer.serialize(HistoryRow::from(&outcome))?;
        }
    }
    let rows = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to serialise history rows: {}", e.error()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut buffer = Vec::with_capacity(rows.len() + 1);
    if missing_trailing_newline(path)? {
        buffer.push(b'\n');
    }
    buffer.extend_from_slice(&rows);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    append_or_rollback(&mut file, &buffer, |file, bytes| {
        file.write_all(bytes)?;
        file.sync_all()
    })?;

    Ok(())
}

/// Run `write` against the end of `file`, restoring the original length if it fails
fn append_or_rollback<F>(file: &mut File, bytes: &[u8], write: F) -> io::Result<()>
where
    F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
{
    let original_len = file.metadata()?.len();

    if let Err(e) = write(&mut *file, bytes) {
        if let Err(truncate_err) = file.set_len(original_len).and_then(|_| file.sync_all()) {
            warn!(
                "Could not roll back partial append: {}",
                truncate_err
            );
        }
        return Err(e);
    }

    Ok(())
}

fn missing_trailing_newline(path: &Path) -> io::Result<bool> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bout, ResultKind};

    const SAMPLE: &str = "\
A,B,win,2019,event-1
C,D,draw,2019,event-1

E,F,nc,2020,event-2
A,D,win,2020,event-2
";

    fn event(id: &str, year: EventYear, bouts: Vec<Bout>) -> EventResults {
        EventResults {
            event_id: id.to_string(),
            event_year: year,
            bouts,
        }
    }

    #[test]
    fn test_load_preserves_order_and_skips_blank_rows() {
        let (history, report) = History::from_reader(SAMPLE.as_bytes(), false).unwrap();

        assert_eq!(report, LoadReport { loaded: 4, skipped: 0 });
        let pairs: Vec<(&str, &str)> = history
            .outcomes()
            .iter()
            .map(|o| (o.loser.as_str(), o.winner.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("C", "D"), ("E", "F"), ("A", "D")]);
        assert_eq!(history.outcomes()[2].kind, ResultKind::NoContest);
    }

    #[test]
    fn test_lenient_load_skips_bad_rows() {
        let data = "A,B,win,2019,e1\nbroken,row\nC,D,dq,2019,e1\nE,F,draw,2019,e1\n";
        let (history, report) = History::from_reader(data.as_bytes(), false).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_strict_load_fails_on_bad_row() {
        let data = "A,B,win,2019,e1\nC,D,dq,2019,e1\n";
        let err = History::from_reader(data.as_bytes(), true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::UnknownResultKind { line: 2, .. })
        ));
    }

    #[test]
    fn test_quoted_names_are_supported() {
        let data = "\"Silva, Anderson\",B,win,2010,e1\n";
        let (history, _) = History::from_reader(data.as_bytes(), true).unwrap();
        assert_eq!(history.outcomes()[0].loser, "Silva, Anderson");
    }

    #[test]
    fn test_events_group_consecutive_rows() {
        let (history, _) = History::from_reader(SAMPLE.as_bytes(), false).unwrap();
        let events: Vec<(&str, EventYear, usize)> = history
            .events()
            .map(|e| (e.event_id, e.event_year, e.outcomes.len()))
            .collect();

        assert_eq!(events, vec![("event-1", 2019, 2), ("event-2", 2020, 2)]);
        assert_eq!(history.event_ids().len(), 2);
    }

    #[test]
    fn test_missing_file_is_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let err = HistoryStore::open(&path, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RatingError>(),
            Some(RatingError::StoreUnavailable { .. })
        ));

        let store = HistoryStore::open_or_empty(&path, false).unwrap();
        assert!(store.history().is_empty());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_append_persists_new_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csv").join("history.csv");

        let mut store = HistoryStore::open_or_empty(&path, false).unwrap();
        let added = store
            .append(&[
                event("e1", 2021, vec![Bout::new("A", "B", ResultKind::Win)]),
                event(
                    "e2",
                    2022,
                    vec![
                        Bout::new("C", "D", ResultKind::Draw),
                        Bout::new("B", "C", ResultKind::NoContest),
                    ],
                ),
            ])
            .unwrap();
        assert_eq!(added, 3);
        assert_eq!(store.history().len(), 3);

        let reloaded = HistoryStore::open(&path, true).unwrap();
        assert_eq!(reloaded.history(), store.history());
        assert_eq!(
            reloaded.known_event_identifiers(),
            ["e1", "e2"]
                .iter()
                .map(|s| s.to_string())
                .collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_append_never_rewrites_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        // Existing file without a trailing newline
        fs::write(&path, "A,B,win,2019,e1").unwrap();

        let mut store = HistoryStore::open(&path, true).unwrap();
        store
            .append(&[event("e2", 2020, vec![Bout::new("C", "D", ResultKind::Win)])])
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "A,B,win,2019,e1\nC,D,win,2020,e2\n");
    }

    #[test]
    fn test_in_memory_append() {
        let mut store = HistoryStore::in_memory(History::new());
        store
            .append(&[event("e1", 2021, vec![Bout::new("A", "B", ResultKind::Win)])])
            .unwrap();

        assert_eq!(store.history().len(), 1);
        assert!(store.path().is_none());
        assert_eq!(store.append(&[]).unwrap(), 0);
    }

    #[test]
    fn test_failed_append_leaves_no_partial_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "A,B,win,2019,e1\n").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        let batch = b"C,D,win,2020,e2\nE,F,win,2020,e2\n";
        let result = append_or_rollback(&mut file, batch, |file, bytes| {
            file.write_all(&bytes[..bytes.len() / 2])?;
            Err(io::Error::other("no space left on device"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "A,B,win,2019,e1\n");

        let reloaded = HistoryStore::open(&path, true).unwrap();
        assert!(!reloaded.known_event_identifiers().contains("e2"));
    }
}

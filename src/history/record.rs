//! Row format of the persisted fight history
//!
//! One headerless CSV row per outcome:
//! `loser,winner,kind,event_year,event_id`.

use crate::error::RatingError;
use crate::types::{EventYear, Outcome, ResultKind};
use csv::StringRecord;
use serde::Serialize;

/// Number of fields in a history row
pub const FIELD_COUNT: usize = 5;

/// Borrowed view of an outcome used for writing
#[derive(Debug, Serialize)]
pub struct HistoryRow<'a> {
    pub loser: &'a str,
    pub winner: &'a str,
    pub kind: &'static str,
    pub event_year: EventYear,
    pub event_id: &'a str,
}

impl<'a> From<&'a Outcome> for HistoryRow<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        Self {
            loser: &outcome.loser,
            winner: &outcome.winner,
            kind: outcome.kind.as_str(),
            event_year: outcome.event_year,
            event_id: &outcome.event_id,
        }
    }
}

/// Whether every field of the record is blank
pub fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Decode one CSV record into an outcome
pub fn decode(record: &StringRecord, line: u64) -> Result<Outcome, RatingError> {
    if record.len() != FIELD_COUNT {
        return Err(RatingError::MalformedRecord {
            line,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, record.len()),
        });
    }

    let loser = record[0].trim();
    let winner = record[1].trim();
    let event_id = record[4].trim();

    if loser.is_empty() || winner.is_empty() {
        return Err(RatingError::MalformedRecord {
            line,
            reason: "fighter name is empty".to_string(),
        });
    }
    if loser == winner {
        return Err(RatingError::MalformedRecord {
            line,
            reason: format!("{} is listed on both sides", loser),
        });
    }
    if event_id.is_empty() {
        return Err(RatingError::MalformedRecord {
            line,
            reason: "event identifier is empty".to_string(),
        });
    }

    let kind: ResultKind = record[2]
        .parse()
        .map_err(|value| RatingError::UnknownResultKind { line, value })?;

    let event_year: EventYear =
        record[3]
            .trim()
            .parse()
            .map_err(|_| RatingError::MalformedRecord {
                line,
                reason: format!("invalid event year '{}'", record[3].trim()),
            })?;

    Ok(Outcome::new(loser, winner, kind, event_id, event_year))
}

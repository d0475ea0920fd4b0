//! Common types used throughout the rating service

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fighter name as it appears in the results
pub type FighterId = String;

/// Identifier of an event (the event page URL for ufcstats.com)
pub type EventId = String;

/// Year the event took place
pub type EventYear = i32;

/// How a bout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Win,
    Draw,
    NoContest,
}

impl ResultKind {
    /// Actual scores as (loser, winner)
    pub fn scores(self) -> (f64, f64) {
        match self {
            ResultKind::Win => (0.0, 1.0),
            ResultKind::Draw | ResultKind::NoContest => (0.5, 0.5),
        }
    }

    /// Spelling used in the history file and on event pages
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Win => "win",
            ResultKind::Draw => "draw",
            ResultKind::NoContest => "nc",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(ResultKind::Win),
            "draw" => Ok(ResultKind::Draw),
            "nc" => Ok(ResultKind::NoContest),
            other => Err(other.to_string()),
        }
    }
}

/// One bout as reported by an event page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bout {
    pub loser: FighterId,
    pub winner: FighterId,
    pub kind: ResultKind,
}

impl Bout {
    pub fn new(loser: impl Into<FighterId>, winner: impl Into<FighterId>, kind: ResultKind) -> Self {
        Self {
            loser: loser.into(),
            winner: winner.into(),
            kind,
        }
    }
}

/// All bouts of one event, in the order they were fought
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
    pub event_id: EventId,
    pub event_year: EventYear,
    pub bouts: Vec<Bout>,
}

impl EventResults {
    /// Flatten into history outcomes tagged with this event
    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.bouts.iter().map(move |bout| Outcome {
            loser: bout.loser.clone(),
            winner: bout.winner.clone(),
            kind: bout.kind,
            event_id: self.event_id.clone(),
            event_year: self.event_year,
        })
    }
}

/// A recorded fight outcome, the unit the rating engine consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub loser: FighterId,
    pub winner: FighterId,
    pub kind: ResultKind,
    pub event_id: EventId,
    pub event_year: EventYear,
}

impl Outcome {
    pub fn new(
        loser: impl Into<FighterId>,
        winner: impl Into<FighterId>,
        kind: ResultKind,
        event_id: impl Into<EventId>,
        event_year: EventYear,
    ) -> Self {
        Self {
            loser: loser.into(),
            winner: winner.into(),
            kind,
            event_id: event_id.into(),
            event_year,
        }
    }
}

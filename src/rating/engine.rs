//! Single forward pass over the fight history
//!
//! The engine owns every fighter record for the duration of one run. Each
//! outcome is applied against the ratings left by all earlier outcomes, so
//! the sequence is consumed strictly in order and exactly once.

use crate::config::RatingConfig;
use crate::error::{RatingError, Result};
use crate::rating::elo::EloCalculator;
use crate::rating::record::FighterRecord;
use crate::rating::standings::Standings;
use crate::types::{FighterId, Outcome, ResultKind};
use std::collections::HashMap;
use tracing::{debug, info};

/// Elo engine for one run
#[derive(Debug)]
pub struct RatingEngine {
    config: RatingConfig,
    calculator: EloCalculator,
    fighters: Vec<FighterRecord>,
    index: HashMap<FighterId, usize>,
    processed: usize,
}

impl RatingEngine {
    /// Create a new engine with no fighters
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            calculator: EloCalculator::from_config(&config),
            config,
            fighters: Vec::new(),
            index: HashMap::new(),
            processed: 0,
        })
    }

    /// Run the whole history through a fresh engine
    pub fn compute<'a, I>(config: RatingConfig, outcomes: I) -> Result<Standings>
    where
        I: IntoIterator<Item = &'a Outcome>,
    {
        let mut engine = Self::new(config)?;
        for outcome in outcomes {
            engine.record_outcome(outcome)?;
        }
        Ok(engine.finish())
    }

    /// Number of outcomes applied so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Apply the next outcome of the sequence
    pub fn record_outcome(&mut self, outcome: &Outcome) -> Result<()> {
        self.validate_outcome(outcome)?;

        let loser = self.resolve(&outcome.loser);
        let winner = self.resolve(&outcome.winner);

        let loser_rating = self.fighters[loser].rating;
        let winner_rating = self.fighters[winner].rating;
        let deltas = self
            .calculator
            .rating_deltas(loser_rating, winner_rating, outcome.kind);

        debug!(
            "{} ({:.1}) vs {} ({:.1}): {} -> {:+.1}/{:+.1}",
            outcome.loser,
            loser_rating,
            outcome.winner,
            winner_rating,
            outcome.kind,
            deltas.loser,
            deltas.winner
        );

        self.fighters[loser].apply_bout(deltas.loser, winner_rating, outcome.event_year);
        self.fighters[winner].apply_bout(deltas.winner, loser_rating, outcome.event_year);

        match outcome.kind {
            ResultKind::Win => {
                self.fighters[loser].record_loss(deltas.loser);
                self.fighters[winner].record_win(deltas.winner);
            }
            ResultKind::Draw => {
                self.fighters[loser].record_draw(deltas.loser);
                self.fighters[winner].record_draw(deltas.winner);
            }
            // Ratings move as in a draw, the record is left alone
            ResultKind::NoContest => {}
        }

        self.processed += 1;
        Ok(())
    }

    /// Finalise schedule strength and hand over every record
    pub fn finish(mut self) -> Standings {
        for fighter in &mut self.fighters {
            fighter.finalize();
        }

        info!(
            "Rated {} fighters over {} outcomes",
            self.fighters.len(),
            self.processed
        );
        Standings::new(self.fighters)
    }

    fn validate_outcome(&self, outcome: &Outcome) -> Result<()> {
        let reason = if outcome.loser.trim().is_empty() || outcome.winner.trim().is_empty() {
            Some("fighter name is empty".to_string())
        } else if outcome.loser == outcome.winner {
            Some(format!("{} cannot fight themself", outcome.loser))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RatingError::InvalidOutcome {
                position: self.processed,
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn resolve(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }

        let idx = self.fighters.len();
        self.fighters.push(FighterRecord::new(
            name.to_string(),
            self.config.starting_rating,
            self.config.recent_window,
            idx,
        ));
        self.index.insert(name.to_string(), idx);
        idx
    }
}

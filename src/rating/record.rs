//! Per-fighter rating record
//!
//! A `FighterRecord` accumulates everything the engine knows about one
//! fighter during the forward pass.

use crate::types::{EventYear, FighterId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed-capacity buffer of the most recent rating changes, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDeltas {
    capacity: usize,
    deltas: VecDeque<f64>,
}

impl RecentDeltas {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            deltas: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a delta, evicting the oldest one when full
    pub fn push(&mut self, delta: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.deltas.len() == self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.deltas.iter().copied()
    }

    /// Net rating change over the buffered fights
    pub fn sum(&self) -> f64 {
        self.deltas.iter().sum()
    }
}

/// Rating state and record of a single fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterRecord {
    pub name: FighterId,
    pub rating: f64,
    pub peak_rating: f64,
    /// Year the peak was reached, `None` while still at the starting rating
    pub peak_rating_year: Option<EventYear>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub fights_played: u32,
    pub unbeaten_streak: u32,
    /// Average pre-fight rating of all opponents, set once the pass finishes
    pub schedule_strength: f64,
    pub recent_deltas: RecentDeltas,
    /// Order of first appearance in the history
    pub first_seen: usize,
    #[serde(skip)]
    opponent_rating_total: f64,
}

impl FighterRecord {
    pub fn new(name: FighterId, starting_rating: f64, recent_window: usize, first_seen: usize) -> Self {
        Self {
            name,
            rating: starting_rating,
            peak_rating: starting_rating,
            peak_rating_year: None,
            wins: 0,
            losses: 0,
            draws: 0,
            fights_played: 0,
            unbeaten_streak: 0,
            schedule_strength: 0.0,
            recent_deltas: RecentDeltas::new(recent_window),
            first_seen,
            opponent_rating_total: 0.0,
        }
    }

    /// Bouts that ended without a decision or draw
    pub fn no_contests(&self) -> u32 {
        self.fights_played - self.wins - self.losses - self.draws
    }

    /// Record formatted as wins-losses-draws
    pub fn record_string(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.draws)
    }

    /// Apply a rating change and the bookkeeping every bout shares
    pub(crate) fn apply_bout(&mut self, delta: f64, opponent_rating: f64, year: EventYear) {
        self.rating += delta;
        self.fights_played += 1;
        self.opponent_rating_total += opponent_rating;

        if self.rating > self.peak_rating {
            self.peak_rating = self.rating;
            self.peak_rating_year = Some(year);
        }
    }

    pub(crate) fn record_win(&mut self, delta: f64) {
        self.wins += 1;
        self.unbeaten_streak += 1;
        self.recent_deltas.push(delta);
    }

    pub(crate) fn record_loss(&mut self, delta: f64) {
        self.losses += 1;
        self.unbeaten_streak = 0;
        self.recent_deltas.push(delta);
    }

    pub(crate) fn record_draw(&mut self, delta: f64) {
        self.draws += 1;
        self.unbeaten_streak += 1;
        self.recent_deltas.push(delta);
    }

    /// Turn the opponent rating total into an average
    pub(crate) fn finalize(&mut self) {
        self.schedule_strength = if self.fights_played > 0 {
            self.opponent_rating_total / self.fights_played as f64
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_deltas_evict_oldest() {
        let mut recent = RecentDeltas::new(3);
        for delta in [1.0, 2.0, 3.0, 4.0, 5.0] {
            recent.push(delta);
        }

        assert_eq!(recent.len(), 3);
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(recent.sum(), 12.0);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut recent = RecentDeltas::new(0);
        recent.push(10.0);
        assert!(recent.is_empty());
        assert_eq!(recent.sum(), 0.0);
    }

    #[test]
    fn test_schedule_strength_without_fights_is_zero() {
        let mut record = FighterRecord::new("Nobody".to_string(), 1200.0, 5, 0);
        record.finalize();
        assert_eq!(record.schedule_strength, 0.0);
    }

    #[test]
    fn test_peak_tracks_strict_maximum() {
        let mut record = FighterRecord::new("A".to_string(), 1200.0, 5, 0);

        record.apply_bout(-10.0, 1200.0, 2018);
        assert_eq!(record.peak_rating, 1200.0);
        assert_eq!(record.peak_rating_year, None);

        record.apply_bout(20.0, 1250.0, 2019);
        assert_eq!(record.peak_rating, 1210.0);
        assert_eq!(record.peak_rating_year, Some(2019));

        record.apply_bout(0.0, 1180.0, 2020);
        assert_eq!(record.peak_rating_year, Some(2019));

        record.finalize();
        assert_eq!(record.schedule_strength, (1200.0 + 1250.0 + 1180.0) / 3.0);
    }

    #[test]
    fn test_record_counters() {
        let mut record = FighterRecord::new("A".to_string(), 1200.0, 5, 0);
        for _ in 0..4 {
            record.apply_bout(0.0, 1200.0, 2020);
        }
        record.record_win(5.0);
        record.record_draw(0.0);
        record.record_loss(-5.0);

        assert_eq!(record.record_string(), "1-1-1");
        assert_eq!(record.no_contests(), 1);
        assert_eq!(record.unbeaten_streak, 0);
    }
}

//! Final rating state and ranking queries

use crate::rating::record::FighterRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Field a ranking is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKey {
    #[default]
    Rating,
    PeakRating,
    ScheduleStrength,
}

impl RankingKey {
    /// The field of `fighter` this key orders by
    pub fn value(self, fighter: &FighterRecord) -> f64 {
        match self {
            RankingKey::Rating => fighter.rating,
            RankingKey::PeakRating => fighter.peak_rating,
            RankingKey::ScheduleStrength => fighter.schedule_strength,
        }
    }
}

impl std::fmt::Display for RankingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingKey::Rating => write!(f, "rating"),
            RankingKey::PeakRating => write!(f, "peak"),
            RankingKey::ScheduleStrength => write!(f, "schedule"),
        }
    }
}

impl FromStr for RankingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rating" | "elo" => Ok(RankingKey::Rating),
            "peak" | "peak_rating" => Ok(RankingKey::PeakRating),
            "schedule" | "schedule_strength" | "sos" => Ok(RankingKey::ScheduleStrength),
            other => Err(format!(
                "Unknown ranking key: {}. Use rating, peak or schedule.",
                other
            )),
        }
    }
}

/// A fighter's position in a ranking
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedFighter<'a> {
    pub rank: usize,
    #[serde(flatten)]
    pub fighter: &'a FighterRecord,
}

/// Every fighter record produced by one engine run, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Standings {
    fighters: Vec<FighterRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Standings {
    pub(crate) fn new(fighters: Vec<FighterRecord>) -> Self {
        let index = fighters
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.name.clone(), idx))
            .collect();
        Self { fighters, index }
    }

    pub fn len(&self) -> usize {
        self.fighters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    /// Look up a fighter by exact name
    pub fn get(&self, name: &str) -> Option<&FighterRecord> {
        self.index.get(name).map(|&idx| &self.fighters[idx])
    }

    /// Records in order of first appearance
    pub fn fighters(&self) -> &[FighterRecord] {
        &self.fighters
    }

    /// All fighters by descending key; ties keep first-seen order
    pub fn ranked(&self, key: RankingKey) -> Vec<RankedFighter<'_>> {
        let mut ordered: Vec<&FighterRecord> = self.fighters.iter().collect();
        // Stable sort over first-seen order
        ordered.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, fighter)| RankedFighter {
                rank: i + 1,
                fighter,
            })
            .collect()
    }

    /// The first `n` entries of the ranking
    pub fn top(&self, n: usize, key: RankingKey) -> Vec<RankedFighter<'_>> {
        let mut ranked = self.ranked(key);
        ranked.truncate(n);
        ranked
    }

    /// Rank of a fighter under the given key
    pub fn rank_of(&self, name: &str, key: RankingKey) -> Option<usize> {
        self.ranked(key)
            .into_iter()
            .find(|entry| entry.fighter.name == name)
            .map(|entry| entry.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(name: &str, rating: f64, first_seen: usize) -> FighterRecord {
        let mut record = FighterRecord::new(name.to_string(), 1200.0, 5, first_seen);
        record.rating = rating;
        record.peak_rating = rating.max(1200.0);
        record
    }

    #[test]
    fn test_top_n_descending() {
        let standings = Standings::new(vec![
            fighter("low", 1150.0, 0),
            fighter("high", 1300.0, 1),
            fighter("mid", 1250.0, 2),
        ]);

        let top: Vec<f64> = standings
            .top(2, RankingKey::Rating)
            .iter()
            .map(|entry| entry.fighter.rating)
            .collect();
        assert_eq!(top, vec![1300.0, 1250.0]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let standings = Standings::new(vec![
            fighter("first", 1200.0, 0),
            fighter("second", 1200.0, 1),
            fighter("third", 1210.0, 2),
        ]);

        let names: Vec<&str> = standings
            .ranked(RankingKey::Rating)
            .iter()
            .map(|entry| entry.fighter.name.as_str())
            .collect();
        assert_eq!(names, vec!["third", "first", "second"]);
        assert_eq!(standings.rank_of("second", RankingKey::Rating), Some(3));
    }

    #[test]
    fn test_rank_window_larger_than_field() {
        let standings = Standings::new(vec![fighter("solo", 1200.0, 0)]);
        assert_eq!(standings.top(15, RankingKey::Rating).len(), 1);
        assert!(Standings::default().top(3, RankingKey::Rating).is_empty());
    }

    #[test]
    fn test_ranking_by_peak() {
        let mut faded = fighter("faded", 1100.0, 0);
        faded.peak_rating = 1400.0;
        let standings = Standings::new(vec![faded, fighter("steady", 1300.0, 1)]);

        let ranked = standings.ranked(RankingKey::PeakRating);
        assert_eq!(ranked[0].fighter.name, "faded");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(standings.rank_of("faded", RankingKey::Rating), Some(2));
    }

    #[test]
    fn test_ranking_key_parsing() {
        assert_eq!("peak".parse::<RankingKey>(), Ok(RankingKey::PeakRating));
        assert_eq!("SOS".parse::<RankingKey>(), Ok(RankingKey::ScheduleStrength));
        assert!("wins".parse::<RankingKey>().is_err());
    }
}

//! Ranking output
//!
//! Renders a ranking window as a compact table, a verbose table or JSON.

use crate::rating::{RankedFighter, RankingKey, Standings};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format for the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

/// What to show and how
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub top: usize,
    pub verbose: bool,
    pub key: RankingKey,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ranked_by: RankingKey,
    total_fighters: usize,
    fighters: Vec<RankedFighter<'a>>,
}

/// Render the top of the ranking
pub fn render(standings: &Standings, options: &ReportOptions) -> Result<String> {
    let entries = standings.top(options.top, options.key);

    match options.format {
        OutputFormat::Json => {
            let report = JsonReport {
                ranked_by: options.key,
                total_fighters: standings.len(),
                fighters: entries,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Table if options.verbose => Ok(render_verbose(&entries, options.key)),
        OutputFormat::Table => Ok(render_compact(&entries, options.key)),
    }
}

/// Render a single fighter, `None` if the name is not in the standings
pub fn render_fighter(
    standings: &Standings,
    name: &str,
    options: &ReportOptions,
) -> Result<Option<String>> {
    let (Some(fighter), Some(rank)) = (standings.get(name), standings.rank_of(name, options.key))
    else {
        return Ok(None);
    };
    let entry = RankedFighter { rank, fighter };

    match options.format {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(&entry)?)),
        OutputFormat::Table => Ok(Some(render_verbose(&[entry], options.key))),
    }
}

fn title(key: RankingKey) -> &'static str {
    match key {
        RankingKey::Rating => "UFC Elo Rankings",
        RankingKey::PeakRating => "UFC Peak Elo Rankings",
        RankingKey::ScheduleStrength => "UFC Strength of Schedule Rankings",
    }
}

fn render_compact(entries: &[RankedFighter<'_>], key: RankingKey) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n--- {} ---", title(key));
    for entry in entries {
        let _ = writeln!(
            out,
            "{:2}. {:<25} {:.1}",
            entry.rank,
            entry.fighter.name,
            key.value(entry.fighter)
        );
    }
    out
}

fn render_verbose(entries: &[RankedFighter<'_>], key: RankingKey) -> String {
    let mut out = String::new();
    let header = format!(
        "{:<5} | {:<25} | {:>8} | {:>9} | {:>7} | {:<10} | {:>6} | {:>12} | {:>8}",
        "Rank", "Fighter", "Elo", "Peak Elo", "Peak Yr", "Record", "Streak", "Avg Opp Elo", "Form"
    );

    let _ = writeln!(out, "\n--- {} (Verbose) ---", title(key));
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.len()));

    for entry in entries {
        let fighter = entry.fighter;
        let peak_year = fighter
            .peak_rating_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let _ = writeln!(
            out,
            "{:<5} | {:<25} | {:>8.1} | {:>9.1} | {:>7} | {:<10} | {:>6} | {:>12.1} | {:>+8.1}",
            entry.rank,
            fighter.name,
            fighter.rating,
            fighter.peak_rating,
            peak_year,
            fighter.record_string(),
            fighter.unbeaten_streak,
            fighter.schedule_strength,
            fighter.recent_deltas.sum()
        );
    }
    out
}

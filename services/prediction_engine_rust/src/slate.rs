//! File contracts for a slate run.
//!
//! Three inputs feed a run: a ratings store (one row per team per date),
//! the slate itself (games, posted odds, rest history) and an optional
//! alias overlay merged over the builtin table. The output is a
//! `RunReport` envelope carrying every game's decision plus the run's
//! metrics snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use courtside_rust_core::matching::AliasTable;
use courtside_rust_core::metrics::MetricsSnapshot;
use courtside_rust_core::pipeline::{GameDecision, SlateGame};
use courtside_rust_core::ratings::{RatingsRow, TeamRatings};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Envelope written at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub as_of: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub games: usize,
    pub decisions: Vec<GameDecision>,
    pub metrics: MetricsSnapshot,
}

/// Extra canonical rows and alias -> canonical pairs layered over the
/// builtin table at startup.
#[derive(Debug, Default, Deserialize)]
pub struct AliasOverlay {
    #[serde(default)]
    pub canonicals: Vec<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// The builtin alias table, plus the overlay file when one is configured.
/// Collisions in the overlay abort startup; a table that silently lost
/// rows would misresolve all night.
pub fn load_alias_table(path: Option<&Path>) -> Result<AliasTable> {
    let mut table = AliasTable::builtin().clone();
    let Some(path) = path else {
        return Ok(table);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading alias overlay {}", path.display()))?;
    let overlay: AliasOverlay = serde_json::from_str(&raw)
        .with_context(|| format!("parsing alias overlay {}", path.display()))?;
    for canonical in &overlay.canonicals {
        table
            .add_canonical(canonical)
            .with_context(|| format!("alias overlay {}", path.display()))?;
    }
    for (alias, canonical) in &overlay.aliases {
        table
            .add_alias(alias, canonical)
            .with_context(|| format!("alias overlay {}", path.display()))?;
    }
    tracing::info!(
        canonicals = overlay.canonicals.len(),
        aliases = overlay.aliases.len(),
        "alias overlay merged"
    );
    Ok(table)
}

/// A JSON array of games with optional odds and rest history.
pub fn load_slate(path: &Path) -> Result<Vec<SlateGame>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading slate file {}", path.display()))?;
    let games: Vec<SlateGame> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing slate file {}", path.display()))?;
    Ok(games)
}

/// Ratings store -> per-team ratings book for the pipeline.
pub fn load_ratings(
    path: &Path,
    as_of: NaiveDate,
    max_age_days: i64,
) -> Result<FxHashMap<String, TeamRatings>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading ratings file {}", path.display()))?;
    let rows: Vec<RatingsRow> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing ratings file {}", path.display()))?;
    Ok(select_ratings(rows, as_of, max_age_days))
}

/// Per team, the most recent validated row at or before `as_of`. Invalid
/// rows drop with a warning and their games later skip at the ratings
/// lookup; stale survivors warn but stay usable.
pub fn select_ratings(
    rows: Vec<RatingsRow>,
    as_of: NaiveDate,
    max_age_days: i64,
) -> FxHashMap<String, TeamRatings> {
    let mut book: FxHashMap<String, TeamRatings> = FxHashMap::default();
    for row in rows {
        let ratings = match TeamRatings::from_row(row) {
            Ok(ratings) => ratings,
            Err(err) => {
                tracing::warn!(%err, "dropping invalid ratings row");
                continue;
            }
        };
        if ratings.as_of > as_of {
            continue;
        }
        let key = ratings.team.to_lowercase();
        match book.get(&key) {
            Some(kept) if kept.as_of >= ratings.as_of => {}
            _ => {
                book.insert(key, ratings);
            }
        }
    }
    for ratings in book.values() {
        let age_days = (as_of - ratings.as_of).num_days();
        if age_days > max_age_days {
            tracing::warn!(team = %ratings.team, age_days, "ratings row is stale");
        }
    }
    book
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(team: &str, as_of: NaiveDate) -> RatingsRow {
        RatingsRow {
            team: Some(team.to_string()),
            as_of: Some(as_of),
            adj_o: Some(105.5),
            adj_d: Some(105.5),
            tempo: Some(67.6),
            rank: Some(150),
            barthag: Some(0.5),
            wab: Some(0.0),
            efg: Some(50.0),
            efgd: Some(50.0),
            tor: Some(18.5),
            tord: Some(18.5),
            orb: Some(28.0),
            drb: Some(72.0),
            ftr: Some(33.0),
            ftrd: Some(33.0),
            two_pt_pct: Some(50.0),
            two_pt_pct_d: Some(50.0),
            three_pt_pct: Some(34.0),
            three_pt_pct_d: Some(34.0),
            three_pt_rate: Some(35.0),
            three_pt_rate_d: Some(35.0),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn picks_the_most_recent_row_at_or_before_as_of() {
        let rows = vec![
            make_row("Duke", day(10)),
            make_row("Duke", day(14)),
            make_row("Duke", day(20)),
        ];
        let book = select_ratings(rows, day(15), 1);
        assert_eq!(book.len(), 1);
        assert_eq!(book["duke"].as_of, day(14));
    }

    #[test]
    fn row_dated_exactly_as_of_is_eligible() {
        let book = select_ratings(vec![make_row("Duke", day(15))], day(15), 1);
        assert_eq!(book["duke"].as_of, day(15));
    }

    #[test]
    fn invalid_rows_drop_without_killing_the_book() {
        let mut bad = make_row("Kansas", day(14));
        bad.tempo = None;
        let rows = vec![bad, make_row("Duke", day(14))];
        let book = select_ratings(rows, day(15), 1);
        assert_eq!(book.len(), 1);
        assert!(book.contains_key("duke"));
    }

    #[test]
    fn stale_rows_stay_usable() {
        let book = select_ratings(vec![make_row("Duke", day(2))], day(15), 1);
        assert_eq!(book["duke"].as_of, day(2));
    }

    #[test]
    fn alias_overlay_parses_both_sections() {
        let raw = r#"{"canonicals": ["Moon St."], "aliases": {"Mooners": "Moon St."}}"#;
        let overlay: AliasOverlay = serde_json::from_str(raw).unwrap();
        assert_eq!(overlay.canonicals, vec!["Moon St."]);
        assert_eq!(overlay.aliases["Mooners"], "Moon St.");
    }
}

//! Pre-prediction validation gate.
//!
//! Everything that can disqualify a game happens here, before any model
//! runs: team resolution (with the aggressive-resolution policy applied),
//! tip-off time normalization, identity sanity, and odds plausibility.
//! The gate is a pure function of (inputs, policy, now); it never reads
//! the environment. Failures are collected into a verdict, never thrown,
//! so a slate run continues past a bad game. Warnings never block.

use std::sync::Arc;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PolicyConfig;
use crate::errors::TimeError;
use crate::matching::{AliasTable, MatchMethod, TeamResolver};
use crate::types::{GameRecord, MarketOdds, ResolvedGame};

/// Timestamp formats accepted for zone-naive tip-off times.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Full-game spread magnitude above which the line is suspect.
const SPREAD_WARN_THRESHOLD: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One field-scoped problem found during validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Outcome of gating one game. `is_valid` and a populated `resolved` go
/// together; errors leave `resolved` empty. The `details` bag carries
/// derived fields (resolution methods, assumed zone, normalized tip-off)
/// so new derivations never force a schema change.
#[derive(Clone, Debug, Serialize)]
pub struct GateVerdict {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub resolved: Option<ResolvedGame>,
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// A tip-off pinned to an instant, with the civil date used for ratings
/// as-of selection.
#[derive(Clone, Copy, Debug)]
pub struct NormalizedTime {
    pub utc: DateTime<Utc>,
    pub local_date: NaiveDate,
    /// True when the input carried no zone and the configured one was
    /// assumed.
    pub assumed_zone: bool,
}

/// Parses tip-off timestamps. Zone-aware input converts directly;
/// zone-naive input is read in the configured civil zone.
#[derive(Clone, Copy, Debug)]
pub struct TimeNormalizer {
    zone: Tz,
}

impl TimeNormalizer {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn normalize(&self, raw: &str) -> Result<NormalizedTime, TimeError> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            let utc = dt.with_timezone(&Utc);
            return Ok(NormalizedTime {
                utc,
                local_date: utc.with_timezone(&self.zone).date_naive(),
                assumed_zone: false,
            });
        }
        for fmt in NAIVE_FORMATS {
            let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) else {
                continue;
            };
            return match self.zone.from_local_datetime(&naive) {
                // A fall-back repeat resolves to the earlier instant.
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(NormalizedTime {
                    utc: dt.with_timezone(&Utc),
                    local_date: dt.date_naive(),
                    assumed_zone: true,
                }),
                LocalResult::None => Err(TimeError::NonexistentLocal(
                    raw.to_string(),
                    self.zone.to_string(),
                )),
            };
        }
        Err(TimeError::Unparseable(raw.to_string()))
    }
}

/// The gate itself. Construct once per run with a table snapshot and the
/// policy computed by the configuration layer.
pub struct PrePredictionGate {
    table: Arc<AliasTable>,
    policy: PolicyConfig,
    time: TimeNormalizer,
    known_teams: Option<FxHashSet<String>>,
}

impl PrePredictionGate {
    pub fn new(table: Arc<AliasTable>, policy: PolicyConfig) -> Self {
        let time = TimeNormalizer::new(policy.civil_zone);
        Self {
            table,
            policy,
            time,
            known_teams: None,
        }
    }

    /// Lowercase canonical names with ratings rows, for resolver
    /// tie-breaking.
    pub fn with_known_teams(mut self, known_teams: FxHashSet<String>) -> Self {
        self.known_teams = Some(known_teams);
        self
    }

    pub fn validate(
        &self,
        game: &GameRecord,
        odds: Option<&MarketOdds>,
        now: DateTime<Utc>,
    ) -> GateVerdict {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut details = serde_json::Map::new();

        let resolver = match &self.known_teams {
            Some(known) => TeamResolver::with_known_teams(&self.table, known),
            None => TeamResolver::new(&self.table),
        };

        let home = self.resolve_side(
            &resolver,
            "home_team",
            &game.home_team,
            &mut errors,
            &mut warnings,
            &mut details,
        );
        let away = self.resolve_side(
            &resolver,
            "away_team",
            &game.away_team,
            &mut errors,
            &mut warnings,
            &mut details,
        );

        if let (Some(h), Some(a)) = (&home, &away) {
            if h == a {
                errors.push(ValidationIssue::error(
                    "game",
                    format!("home and away both resolve to `{h}`"),
                ));
            }
        }

        let tip = match self.time.normalize(&game.commence_time) {
            Ok(t) => {
                if t.assumed_zone {
                    warnings.push(ValidationIssue::warning(
                        "commence_time",
                        format!("no zone info, assumed {}", self.time.zone()),
                    ));
                    details.insert("assumed_zone".into(), json!(self.time.zone().to_string()));
                }
                details.insert("tip_off_utc".into(), json!(t.utc.to_rfc3339()));
                details.insert("local_date".into(), json!(t.local_date.to_string()));
                if t.utc < now {
                    warnings.push(ValidationIssue::warning(
                        "commence_time",
                        "commence time is in the past",
                    ));
                }
                Some(t)
            }
            Err(err) => {
                errors.push(ValidationIssue::error("commence_time", err.to_string()));
                None
            }
        };

        if let Some(odds) = odds {
            self.check_odds(odds, &mut warnings);
        }

        let is_valid = errors.is_empty();
        let resolved = match (is_valid, home, away, tip) {
            (true, Some(home), Some(away), Some(tip)) => Some(ResolvedGame {
                game_id: game.id,
                home_team: home,
                away_team: away,
                tip_off: tip.utc,
                local_date: tip.local_date,
                is_neutral: game.is_neutral,
            }),
            _ => None,
        };

        GateVerdict {
            is_valid,
            errors,
            warnings,
            resolved,
            details,
        }
    }

    /// Resolve one side, applying the aggressive-resolution policy.
    /// Returns the canonical name only when usable under policy.
    fn resolve_side(
        &self,
        resolver: &TeamResolver<'_>,
        field: &str,
        raw: &str,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationIssue>,
        details: &mut serde_json::Map<String, serde_json::Value>,
    ) -> Option<String> {
        match resolver.resolve(raw) {
            None => {
                errors.push(ValidationIssue::error(
                    field,
                    format!("cannot resolve team `{raw}`"),
                ));
                None
            }
            Some(team) if team.method == MatchMethod::Aggressive => {
                if !self.policy.aggressive_allowed() {
                    errors.push(ValidationIssue::error(
                        field,
                        format!(
                            "`{raw}` requires aggressive resolution, disabled by policy"
                        ),
                    ));
                    return None;
                }
                warnings.push(ValidationIssue::warning(
                    field,
                    format!("`{raw}` resolved aggressively to `{}`", team.canonical),
                ));
                details.insert(format!("{field}_method"), json!(team.method.label()));
                details.insert(format!("{field}_canonical"), json!(team.canonical));
                Some(team.canonical)
            }
            Some(team) => {
                details.insert(format!("{field}_method"), json!(team.method.label()));
                details.insert(format!("{field}_canonical"), json!(team.canonical));
                Some(team.canonical)
            }
        }
    }

    /// Plausibility checks on quoted odds. These are warnings only;
    /// ingestion already rejected rows that fail hard validation.
    fn check_odds(&self, odds: &MarketOdds, warnings: &mut Vec<ValidationIssue>) {
        if let Some(spread) = odds.spread {
            if spread.abs() > SPREAD_WARN_THRESHOLD {
                warnings.push(ValidationIssue::warning(
                    "odds.spread",
                    format!("spread {spread} is unusually large"),
                ));
            }
        }
        for market in crate::types::BetType::ALL {
            if odds.line_for(market).is_none() {
                continue;
            }
            let (first, second) = odds.prices_for(market);
            if first.is_none() || second.is_none() {
                warnings.push(ValidationIssue::warning(
                    "odds.prices",
                    format!("{} line quoted without both side prices", market.label()),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BetType;

    fn make_game(home: &str, away: &str) -> GameRecord {
        GameRecord::new(home, away, "2025-01-15T19:00:00")
    }

    fn dev_policy() -> PolicyConfig {
        PolicyConfig {
            is_production: false,
            ..PolicyConfig::default()
        }
    }

    fn gate(policy: PolicyConfig) -> PrePredictionGate {
        PrePredictionGate::new(Arc::new(AliasTable::builtin().clone()), policy)
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn clean_game_passes_with_zone_warning() {
        let verdict = gate(dev_policy()).validate(&make_game("Duke", "Kansas"), None, fixed_now());
        assert!(verdict.is_valid);
        assert!(verdict.errors.is_empty());
        assert_eq!(verdict.warnings.len(), 1);
        assert_eq!(verdict.warnings[0].field, "commence_time");

        let resolved = verdict.resolved.unwrap();
        assert_eq!(resolved.home_team, "Duke");
        assert_eq!(resolved.away_team, "Kansas");
        // 19:00 CST on Jan 15 is 01:00 UTC on Jan 16; the civil date is
        // what ratings selection keys on.
        assert_eq!(
            resolved.tip_off,
            Utc.with_ymd_and_hms(2025, 1, 16, 1, 0, 0).unwrap()
        );
        assert_eq!(resolved.local_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(verdict.details["home_team_method"], "exact");
    }

    #[test]
    fn zoned_timestamp_needs_no_assumption() {
        let mut game = make_game("Duke", "Kansas");
        game.commence_time = "2025-01-15T19:00:00-05:00".to_string();
        let verdict = gate(dev_policy()).validate(&game, None, fixed_now());
        assert!(verdict.is_valid);
        assert!(verdict.warnings.is_empty());
        assert!(!verdict.details.contains_key("assumed_zone"));
    }

    #[test]
    fn aggressive_blocked_by_policy_is_field_scoped_error() {
        let policy = PolicyConfig {
            disable_aggressive: true,
            allow_aggressive_override: false,
            is_production: false,
            ..PolicyConfig::default()
        };
        let verdict =
            gate(policy).validate(&make_game("Illinois State Redbirds", "Duke"), None, fixed_now());
        assert!(!verdict.is_valid);
        assert!(verdict.resolved.is_none());
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.errors[0].field, "home_team");
        assert!(verdict.errors[0].message.contains("aggressive"));
    }

    #[test]
    fn aggressive_allowed_resolves_with_warning() {
        let verdict = gate(dev_policy()).validate(
            &make_game("Illinois State Redbirds", "Duke"),
            None,
            fixed_now(),
        );
        assert!(verdict.is_valid);
        let resolved = verdict.resolved.unwrap();
        assert_eq!(resolved.home_team, "Illinois St.");
        assert_eq!(verdict.details["home_team_method"], "aggressive");
        assert!(verdict
            .warnings
            .iter()
            .any(|w| w.field == "home_team" && w.message.contains("aggressively")));
    }

    #[test]
    fn production_default_fails_closed() {
        let verdict = gate(PolicyConfig::default()).validate(
            &make_game("Illinois State Redbirds", "Duke"),
            None,
            fixed_now(),
        );
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors[0].field, "home_team");
    }

    #[test]
    fn unknown_team_is_fatal() {
        let verdict =
            gate(dev_policy()).validate(&make_game("Hogwarts", "Duke"), None, fixed_now());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors[0].field, "home_team");
    }

    #[test]
    fn same_canonical_identity_is_fatal() {
        let verdict = gate(dev_policy()).validate(
            &make_game("Duke", "Duke Blue Devils"),
            None,
            fixed_now(),
        );
        assert!(!verdict.is_valid);
        assert!(verdict.errors.iter().any(|e| e.field == "game"));
    }

    #[test]
    fn unparseable_time_is_fatal() {
        let mut game = make_game("Duke", "Kansas");
        game.commence_time = "whenever".to_string();
        let verdict = gate(dev_policy()).validate(&game, None, fixed_now());
        assert!(!verdict.is_valid);
        assert!(verdict.errors.iter().any(|e| e.field == "commence_time"));
    }

    #[test]
    fn nonexistent_local_time_is_fatal() {
        // 2:30 AM on 2025-03-09 falls in the spring-forward gap.
        let mut game = make_game("Duke", "Kansas");
        game.commence_time = "2025-03-09T02:30:00".to_string();
        let verdict = gate(dev_policy()).validate(&game, None, fixed_now());
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].message.contains("does not exist"));
    }

    #[test]
    fn past_tipoff_warns_but_passes() {
        let mut game = make_game("Duke", "Kansas");
        game.commence_time = "2020-01-01T12:00:00".to_string();
        let verdict = gate(dev_policy()).validate(&game, None, fixed_now());
        assert!(verdict.is_valid);
        assert!(verdict
            .warnings
            .iter()
            .any(|w| w.message.contains("in the past")));
    }

    #[test]
    fn odds_problems_warn_never_block() {
        let odds = MarketOdds {
            spread: Some(-41.5),
            spread_home_price: Some(-110),
            total: Some(145.5),
            ..Default::default()
        };
        let verdict =
            gate(dev_policy()).validate(&make_game("Duke", "Kansas"), Some(&odds), fixed_now());
        assert!(verdict.is_valid);
        assert!(verdict
            .warnings
            .iter()
            .any(|w| w.field == "odds.spread"));
        // Spread missing the away price, total missing both.
        let price_warnings = verdict
            .warnings
            .iter()
            .filter(|w| w.field == "odds.prices")
            .count();
        assert_eq!(price_warnings, 2);
    }

    #[test]
    fn time_normalizer_accepts_documented_formats() {
        let norm = TimeNormalizer::new(chrono_tz::America::Chicago);
        for raw in [
            "2025-01-15T19:00:00",
            "2025-01-15 19:00:00",
            "2025-01-15T19:00",
            "2025-01-15 19:00",
        ] {
            let t = norm.normalize(raw).unwrap();
            assert!(t.assumed_zone, "{raw}");
            assert_eq!(t.utc, Utc.with_ymd_and_hms(2025, 1, 16, 1, 0, 0).unwrap());
        }
        let zoned = norm.normalize("2025-01-15T20:00:00-06:00").unwrap();
        assert!(!zoned.assumed_zone);
        assert_eq!(zoned.local_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn fall_back_repeat_takes_earlier_instant() {
        // 1:30 AM on 2024-11-03 occurs twice in Chicago.
        let norm = TimeNormalizer::new(chrono_tz::America::Chicago);
        let t = norm.normalize("2024-11-03T01:30:00").unwrap();
        // Earlier instant is still CDT (UTC-5).
        assert_eq!(t.utc, Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap());
    }

    #[test]
    fn market_routing_consistency_in_warnings() {
        let odds = MarketOdds {
            total_1h: Some(68.5),
            over_1h_price: Some(-110),
            ..Default::default()
        };
        let verdict =
            gate(dev_policy()).validate(&make_game("Duke", "Kansas"), Some(&odds), fixed_now());
        assert!(verdict
            .warnings
            .iter()
            .any(|w| w.message.contains(BetType::FirstHalfTotal.label())));
    }
}

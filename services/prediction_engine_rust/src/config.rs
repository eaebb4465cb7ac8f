//! Service configuration from the environment.
//!
//! Paths and the as-of date drive the run; policy and model knobs are
//! selective overrides on top of the library defaults. Bad values for a
//! path or flag fall back to the default, but an explicitly malformed
//! zone or date aborts startup rather than silently running the wrong
//! slate.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use courtside_rust_core::config::{ModelConfig, PolicyConfig};

const DEFAULT_RATINGS_PATH: &str = "data/ratings.json";
const DEFAULT_SLATE_PATH: &str = "data/slate.json";

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub ratings_path: String,
    pub slate_path: String,
    /// Decisions go here as JSON; stdout when unset.
    pub output_path: Option<String>,
    /// Optional alias overlay merged over the builtin table.
    pub alias_path: Option<String>,
    /// Explicit ratings as-of date; today in the civil zone when unset.
    pub as_of: Option<NaiveDate>,
    pub policy: PolicyConfig,
    pub model: ModelConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = PolicyConfig::default();
        let civil_zone = match env::var("CIVIL_ZONE") {
            Ok(raw) => raw
                .parse::<Tz>()
                .map_err(|err| anyhow!("bad CIVIL_ZONE `{raw}`: {err}"))?,
            Err(_) => defaults.civil_zone,
        };
        let as_of = match env::var("AS_OF_DATE") {
            Ok(raw) => Some(
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("bad AS_OF_DATE `{raw}`, want YYYY-MM-DD"))?,
            ),
            Err(_) => None,
        };

        let policy = PolicyConfig {
            disable_aggressive: env_flag("DISABLE_AGGRESSIVE_MATCHING", defaults.disable_aggressive),
            allow_aggressive_override: env_flag(
                "ALLOW_AGGRESSIVE_OVERRIDE",
                defaults.allow_aggressive_override,
            ),
            is_production: env_flag("IS_PRODUCTION", defaults.is_production),
            civil_zone,
            ratings_max_age_days: env_parsed(
                "RATINGS_MAX_AGE_DAYS",
                defaults.ratings_max_age_days,
            ),
        };

        let mut model = ModelConfig::default();
        model.recommendation.min_confidence =
            env_parsed("MIN_CONFIDENCE", model.recommendation.min_confidence);
        model.recommendation.kelly_fraction =
            env_parsed("KELLY_FRACTION", model.recommendation.kelly_fraction);
        model.recommendation.max_bet_units =
            env_parsed("MAX_BET_UNITS", model.recommendation.max_bet_units);
        model.spread.home_court_advantage = env_parsed(
            "HOME_COURT_ADVANTAGE",
            model.spread.home_court_advantage,
        );

        Ok(Self {
            ratings_path: env::var("RATINGS_PATH")
                .unwrap_or_else(|_| DEFAULT_RATINGS_PATH.to_string()),
            slate_path: env::var("SLATE_PATH").unwrap_or_else(|_| DEFAULT_SLATE_PATH.to_string()),
            output_path: env::var("OUTPUT_PATH").ok(),
            alias_path: env::var("ALIAS_PATH").ok(),
            as_of,
            policy,
            model,
        })
    }

    /// The ratings as-of date for this run.
    pub fn as_of_date(&self, now: DateTime<Utc>) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| now.with_timezone(&self.policy.civil_zone).date_naive())
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(default)
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

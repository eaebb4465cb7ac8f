//! Rest and fatigue adjustments.
//!
//! Rest is measured from the most recent game strictly before tip-off.
//! A team with no prior game on record gets the configured default rest
//! and no penalty. Fatigue penalties are negative numbers; the spread
//! adjustment is positive when the situation favors the home team.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SituationalConfig;
use crate::types::round2;

/// One team's rest situation going into a game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RestInfo {
    pub team: String,
    pub days_rest: i64,
    pub is_back_to_back: bool,
    pub last_game: Option<DateTime<Utc>>,
}

/// Combined rest effect on the spread and total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SituationalAdjustment {
    /// Points added to the home margin. Positive favors home.
    pub spread_adjustment: f64,
    /// Points added to the expected total. Tired teams score less, so
    /// this is zero or negative.
    pub total_adjustment: f64,
    pub home_fatigue: f64,
    pub away_fatigue: f64,
}

pub struct SituationalAdjuster {
    config: SituationalConfig,
}

impl SituationalAdjuster {
    pub fn new(config: SituationalConfig) -> Self {
        Self { config }
    }

    /// `history` holds the team's prior tip-offs sorted most recent first;
    /// the first entry strictly before `tip_off` is the last game played.
    pub fn compute_rest_info(
        &self,
        team: &str,
        tip_off: DateTime<Utc>,
        history: &[DateTime<Utc>],
    ) -> RestInfo {
        let last_game = history.iter().copied().find(|g| *g < tip_off);
        match last_game {
            None => RestInfo {
                team: team.to_string(),
                days_rest: self.config.default_days_rest,
                is_back_to_back: false,
                last_game: None,
            },
            Some(last) => {
                let elapsed = tip_off - last;
                let days_rest = elapsed.num_days();
                let is_back_to_back = days_rest == 0
                    || (days_rest == 1 && elapsed.num_hours() < self.config.b2b_hours_threshold);
                RestInfo {
                    team: team.to_string(),
                    days_rest,
                    is_back_to_back,
                    last_game: Some(last),
                }
            }
        }
    }

    pub fn compute_adjustment(&self, home: &RestInfo, away: &RestInfo) -> SituationalAdjustment {
        if !self.config.enabled {
            return SituationalAdjustment::default();
        }
        let home_fatigue = self.fatigue_penalty(home);
        let away_fatigue = self.fatigue_penalty(away);
        let rest_differential = (home.days_rest - away.days_rest) as f64;
        let rest_term = (rest_differential * self.config.rest_differential_factor).clamp(
            -self.config.max_rest_differential_adj,
            self.config.max_rest_differential_adj,
        );
        SituationalAdjustment {
            spread_adjustment: round2(home_fatigue - away_fatigue + rest_term),
            total_adjustment: round2((home_fatigue + away_fatigue) * self.config.total_fatigue_factor),
            home_fatigue,
            away_fatigue,
        }
    }

    fn fatigue_penalty(&self, rest: &RestInfo) -> f64 {
        if rest.is_back_to_back {
            self.config.b2b_penalty
        } else if rest.days_rest == 1 {
            self.config.one_day_penalty
        } else {
            0.0
        }
    }
}

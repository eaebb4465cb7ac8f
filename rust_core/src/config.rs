//! Model and policy configuration for the decision pipeline.
//!
//! This module provides:
//! - `LeagueAverages` - Division I baseline rates the models measure against
//! - Per-market calibration blocks (home-court advantage, sigma, thresholds)
//! - `ModelConfig` - the full parameter set, built once at startup
//! - `PolicyConfig` - resolution policy and civil-zone settings for the gate
//!
//! Every constant a model or adjuster consumes lives here so calibration
//! changes never require touching model code. The library reads no
//! environment state; the service layer assembles these from env and passes
//! them in.

use chrono_tz::Tz;

use crate::types::BetType;

/// Full-game home-court advantage in points.
/// Backtested over three seasons of D1 results.
pub const DEFAULT_HOME_COURT_ADVANTAGE: f64 = 5.8;

/// First-half home-court advantage, calibrated independently of the
/// full-game number (HCA is front-loaded but not exactly half).
pub const DEFAULT_H1_HOME_COURT_ADVANTAGE: f64 = 3.6;

/// Additive calibration on the full-game total. The raw efficiency-times-
/// tempo projection runs hot against closing lines by about this much.
pub const DEFAULT_TOTAL_CALIBRATION: f64 = -9.5;

/// Division I league averages used as the zero point for matchup and style
/// adjustments. Updated once per season.
#[derive(Debug, Clone, Copy)]
pub struct LeagueAverages {
    /// Possessions per 40 minutes.
    pub tempo: f64,
    /// Points per 100 possessions.
    pub efficiency: f64,
    /// Offensive rebound percentage.
    pub orb_pct: f64,
    /// Turnover percentage.
    pub tor_pct: f64,
    /// Free throw rate (FTA/FGA * 100).
    pub ftr: f64,
    /// Share of field goal attempts from three.
    pub three_pt_rate: f64,
    /// Effective field goal percentage.
    pub efg_pct: f64,
}

impl Default for LeagueAverages {
    fn default() -> Self {
        Self {
            tempo: 67.6,
            efficiency: 105.5,
            orb_pct: 28.0,
            tor_pct: 18.5,
            ftr: 33.0,
            three_pt_rate: 35.0,
            efg_pct: 50.0,
        }
    }
}

/// Point weights applied to four-factors differentials in the shared
/// matchup adjustment.
#[derive(Debug, Clone, Copy)]
pub struct MatchupWeights {
    pub rebounding: f64,
    pub turnovers: f64,
    pub free_throws: f64,
}

impl Default for MatchupWeights {
    fn default() -> Self {
        Self {
            rebounding: 0.15,
            turnovers: 0.10,
            free_throws: 0.15,
        }
    }
}

/// Edge ladder for one market: min < optimal < max, in points.
///
/// Below `min_edge` nothing is bet. Between `min_edge` and `optimal_edge`
/// the edge is real but thin (surfaced as a weak pass, not a bet). At
/// `max_edge` and beyond the market disagrees with the model so strongly
/// that the bet gets the top strength tier.
#[derive(Debug, Clone, Copy)]
pub struct EdgeThresholds {
    pub min_edge: f64,
    pub optimal_edge: f64,
    pub max_edge: f64,
}

/// Full-game spread model calibration.
#[derive(Debug, Clone, Copy)]
pub struct SpreadModelConfig {
    pub home_court_advantage: f64,
    pub base_sigma: f64,
    /// Backtest residual standard error, feeds the confidence heuristic.
    pub std_error: f64,
}

impl Default for SpreadModelConfig {
    fn default() -> Self {
        Self {
            home_court_advantage: DEFAULT_HOME_COURT_ADVANTAGE,
            base_sigma: 11.0,
            std_error: 10.57,
        }
    }
}

/// Full-game total model calibration.
#[derive(Debug, Clone, Copy)]
pub struct TotalModelConfig {
    /// Venue effect on combined scoring. Zero: home edge moves the margin,
    /// not the total.
    pub home_court_advantage: f64,
    pub calibration: f64,
    pub base_variance: f64,
    pub std_error: f64,
}

impl Default for TotalModelConfig {
    fn default() -> Self {
        Self {
            home_court_advantage: 0.0,
            calibration: DEFAULT_TOTAL_CALIBRATION,
            base_variance: 20.0,
            std_error: 13.1,
        }
    }
}

/// First-half spread model calibration.
#[derive(Debug, Clone, Copy)]
pub struct FirstHalfSpreadConfig {
    pub home_court_advantage: f64,
    pub base_sigma: f64,
    pub std_error: f64,
}

impl Default for FirstHalfSpreadConfig {
    fn default() -> Self {
        Self {
            home_court_advantage: DEFAULT_H1_HOME_COURT_ADVANTAGE,
            base_sigma: 12.65,
            std_error: 8.25,
        }
    }
}

/// First-half total model calibration.
#[derive(Debug, Clone, Copy)]
pub struct FirstHalfTotalConfig {
    pub home_court_advantage: f64,
    pub std_error: f64,
}

impl Default for FirstHalfTotalConfig {
    fn default() -> Self {
        Self {
            home_court_advantage: 0.0,
            std_error: 8.88,
        }
    }
}

/// Rest and fatigue adjustment parameters.
#[derive(Debug, Clone, Copy)]
pub struct SituationalConfig {
    pub enabled: bool,
    /// Points docked from a team on the second night of a back-to-back.
    pub b2b_penalty: f64,
    /// Points docked at exactly one day of rest.
    pub one_day_penalty: f64,
    /// Points per day of rest differential.
    pub rest_differential_factor: f64,
    /// Cap on the rest differential term, either direction.
    pub max_rest_differential_adj: f64,
    /// Fraction of combined fatigue flowing into the total.
    pub total_fatigue_factor: f64,
    /// Rest assumed when a team has no prior game on record.
    pub default_days_rest: i64,
    /// One-day rest still counts as a back-to-back under this many hours
    /// between tips.
    pub b2b_hours_threshold: i64,
}

impl Default for SituationalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            b2b_penalty: -2.25,
            one_day_penalty: -1.25,
            rest_differential_factor: 0.5,
            max_rest_differential_adj: 2.0,
            total_fatigue_factor: 0.3,
            default_days_rest: 7,
            b2b_hours_threshold: 36,
        }
    }
}

/// Game-specific sigma parameters.
#[derive(Debug, Clone, Copy)]
pub struct VarianceConfig {
    pub enabled: bool,
    pub base_sigma: f64,
    /// Sigma points per point of three-point attempt rate above league
    /// average.
    pub three_pt_variance_factor: f64,
    /// Sigma points per possession of tempo mismatch.
    pub pace_variance_factor: f64,
    pub min_sigma: f64,
    pub max_sigma: f64,
    /// First-half sigma relative to full game. Shorter sample, higher
    /// relative variance.
    pub first_half_multiplier: f64,
}

impl Default for VarianceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_sigma: 11.0,
            three_pt_variance_factor: 0.15,
            pace_variance_factor: 0.10,
            min_sigma: 9.0,
            max_sigma: 14.0,
            first_half_multiplier: 1.15,
        }
    }
}

/// Dynamic first-half scaling parameters.
#[derive(Debug, Clone, Copy)]
pub struct FirstHalfFactorConfig {
    pub enabled: bool,
    /// Share of full-game scoring expected in the first half.
    pub base_tempo_factor: f64,
    pub efg_tempo_adjustment: f64,
    pub tempo_factor_min: f64,
    pub tempo_factor_max: f64,
    /// Share of the full-game margin expected by halftime.
    pub base_margin_scale: f64,
    pub efg_margin_adjustment: f64,
    pub margin_scale_min: f64,
    pub margin_scale_max: f64,
    pub base_confidence_scale: f64,
}

impl Default for FirstHalfFactorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_tempo_factor: 0.48,
            efg_tempo_adjustment: 0.005,
            tempo_factor_min: 0.44,
            tempo_factor_max: 0.52,
            base_margin_scale: 0.50,
            efg_margin_adjustment: 0.01,
            margin_scale_min: 0.45,
            margin_scale_max: 0.55,
            base_confidence_scale: 0.90,
        }
    }
}

/// Recommendation engine parameters: gates, sizing and probability
/// calibration.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationConfig {
    /// Minimum model confidence to issue any bet. AND-ed with the edge
    /// gate, never a substitute for it.
    pub min_confidence: f64,
    /// Fraction of full Kelly actually staked.
    pub kelly_fraction: f64,
    pub max_bet_units: f64,
    pub min_bet_units: f64,
    /// Cap on edge/sigma before the normal CDF. Tail edges are data
    /// problems more often than 99th-percentile opinions.
    pub z_score_cap: f64,
    pub model_prob_floor: f64,
    pub model_prob_ceil: f64,
    /// Full-game totals outside this band sit in poorly-calibrated tails.
    pub fg_total_reliable: (f64, f64),
    pub h1_total_reliable: (f64, f64),
    pub spread_thresholds: EdgeThresholds,
    pub total_thresholds: EdgeThresholds,
    pub h1_spread_thresholds: EdgeThresholds,
    pub h1_total_thresholds: EdgeThresholds,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.65,
            kelly_fraction: 0.25,
            max_bet_units: 3.0,
            min_bet_units: 0.5,
            z_score_cap: 2.5,
            model_prob_floor: 0.15,
            model_prob_ceil: 0.85,
            fg_total_reliable: (120.0, 170.0),
            h1_total_reliable: (55.0, 85.0),
            spread_thresholds: EdgeThresholds {
                min_edge: 2.0,
                optimal_edge: 5.0,
                max_edge: 10.0,
            },
            total_thresholds: EdgeThresholds {
                min_edge: 3.0,
                optimal_edge: 4.5,
                max_edge: 6.0,
            },
            h1_spread_thresholds: EdgeThresholds {
                min_edge: 2.0,
                optimal_edge: 3.5,
                max_edge: 7.0,
            },
            h1_total_thresholds: EdgeThresholds {
                min_edge: 2.0,
                optimal_edge: 2.5,
                max_edge: 3.5,
            },
        }
    }
}

impl RecommendationConfig {
    /// Edge ladder for a market.
    pub fn thresholds_for(&self, bet_type: BetType) -> EdgeThresholds {
        match bet_type {
            BetType::Spread => self.spread_thresholds,
            BetType::Total => self.total_thresholds,
            BetType::FirstHalfSpread => self.h1_spread_thresholds,
            BetType::FirstHalfTotal => self.h1_total_thresholds,
        }
    }

    /// Reliable market-total band, if the market has one.
    pub fn reliable_range_for(&self, bet_type: BetType) -> Option<(f64, f64)> {
        match bet_type {
            BetType::Total => Some(self.fg_total_reliable),
            BetType::FirstHalfTotal => Some(self.h1_total_reliable),
            BetType::Spread | BetType::FirstHalfSpread => None,
        }
    }
}

/// The complete model parameter set. One instance per run, shared read-only
/// across the slate.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub league: LeagueAverages,
    pub matchup: MatchupWeights,
    pub spread: SpreadModelConfig,
    pub total: TotalModelConfig,
    pub h1_spread: FirstHalfSpreadConfig,
    pub h1_total: FirstHalfTotalConfig,
    pub situational: SituationalConfig,
    pub variance: VarianceConfig,
    pub first_half: FirstHalfFactorConfig,
    pub recommendation: RecommendationConfig,
}

impl ModelConfig {
    /// Backtest residual standard error for a market.
    pub fn std_error_for(&self, bet_type: BetType) -> f64 {
        match bet_type {
            BetType::Spread => self.spread.std_error,
            BetType::Total => self.total.std_error,
            BetType::FirstHalfSpread => self.h1_spread.std_error,
            BetType::FirstHalfTotal => self.h1_total.std_error,
        }
    }
}

/// Resolution policy and time handling for the validation gate.
///
/// The gate is a pure function of its inputs and this value. Nothing in the
/// library reads the environment; the service layer owns that.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Hard-disable mascot-stripping resolution regardless of deployment.
    pub disable_aggressive: bool,
    /// Explicit opt-in that beats `disable_aggressive`.
    pub allow_aggressive_override: bool,
    /// Production deployments never use aggressive resolution implicitly.
    pub is_production: bool,
    /// Civil zone assumed for zone-naive schedule timestamps.
    pub civil_zone: Tz,
    /// Ratings rows older than this draw a freshness warning.
    pub ratings_max_age_days: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            disable_aggressive: false,
            allow_aggressive_override: false,
            is_production: true,
            civil_zone: chrono_tz::America::Chicago,
            ratings_max_age_days: 1,
        }
    }
}

impl PolicyConfig {
    /// Whether the resolver may fall back to mascot stripping.
    ///
    /// Allowed only on explicit override, or implicitly outside production
    /// when not hard-disabled. Fail closed everywhere else.
    pub fn aggressive_allowed(&self) -> bool {
        self.allow_aggressive_override || (!self.disable_aggressive && !self.is_production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_ordered() {
        let rec = RecommendationConfig::default();
        for bet_type in BetType::ALL {
            let t = rec.thresholds_for(bet_type);
            assert!(
                t.min_edge < t.optimal_edge && t.optimal_edge < t.max_edge,
                "ladder out of order for {:?}",
                bet_type
            );
        }
    }

    #[test]
    fn test_reliable_ranges_only_on_totals() {
        let rec = RecommendationConfig::default();
        assert!(rec.reliable_range_for(BetType::Total).is_some());
        assert!(rec.reliable_range_for(BetType::FirstHalfTotal).is_some());
        assert!(rec.reliable_range_for(BetType::Spread).is_none());
        assert!(rec.reliable_range_for(BetType::FirstHalfSpread).is_none());
    }

    #[test]
    fn test_aggressive_policy_default_is_closed() {
        let policy = PolicyConfig::default();
        assert!(!policy.aggressive_allowed());
    }

    #[test]
    fn test_aggressive_policy_override_wins() {
        let policy = PolicyConfig {
            disable_aggressive: true,
            allow_aggressive_override: true,
            is_production: true,
            ..PolicyConfig::default()
        };
        assert!(policy.aggressive_allowed());
    }

    #[test]
    fn test_aggressive_policy_dev_without_disable() {
        let policy = PolicyConfig {
            is_production: false,
            ..PolicyConfig::default()
        };
        assert!(policy.aggressive_allowed());

        let disabled = PolicyConfig {
            is_production: false,
            disable_aggressive: true,
            ..PolicyConfig::default()
        };
        assert!(!disabled.aggressive_allowed());
    }

    #[test]
    fn test_h1_hca_not_half_of_fg() {
        let cfg = ModelConfig::default();
        assert!((cfg.h1_spread.home_court_advantage - 3.6).abs() < 1e-9);
        assert!(
            (cfg.spread.home_court_advantage / 2.0 - cfg.h1_spread.home_court_advantage).abs()
                > 0.5
        );
    }
}

//! Dynamic first-half scaling.
//!
//! Better-shooting matchups put more of the game's scoring in the first
//! half, and a wide shooting gap lets the stronger team pull away before
//! the break. Both effects move the 1H factors off their base constants.

use serde::Serialize;
use tracing::debug;

use crate::config::{FirstHalfFactorConfig, LeagueAverages};
use crate::ratings::TeamRatings;
use crate::types::{round2, round3, round4};

/// Factors carried from the full-game projection into the 1H markets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FirstHalfFactors {
    /// Share of full-game scoring expected before the break.
    pub tempo_factor: f64,
    /// Share of the full-game margin expected by halftime.
    pub margin_scale: f64,
    /// Multiplier applied to 1H confidence.
    pub confidence_scale: f64,
    /// Home EFG minus away EFG, percentage points.
    pub efg_differential: f64,
    pub reasoning: String,
}

pub struct FirstHalfFactorCalculator {
    config: FirstHalfFactorConfig,
    league: LeagueAverages,
}

impl FirstHalfFactorCalculator {
    pub fn new(config: FirstHalfFactorConfig, league: LeagueAverages) -> Self {
        Self { config, league }
    }

    /// Callers never special-case the disabled state; they get the base
    /// constants back and proceed as usual.
    pub fn calculate_factors(&self, home: &TeamRatings, away: &TeamRatings) -> FirstHalfFactors {
        let cfg = &self.config;
        if !cfg.enabled {
            return FirstHalfFactors {
                tempo_factor: cfg.base_tempo_factor,
                margin_scale: cfg.base_margin_scale,
                confidence_scale: cfg.base_confidence_scale,
                efg_differential: 0.0,
                reasoning: "dynamic 1H factors disabled, using base factors".to_string(),
            };
        }

        let efg_diff = home.efg - away.efg;
        let avg_efg = (home.efg + away.efg) / 2.0;

        let tempo_adj = (avg_efg - self.league.efg_pct) * cfg.efg_tempo_adjustment;
        let tempo_factor =
            (cfg.base_tempo_factor + tempo_adj).clamp(cfg.tempo_factor_min, cfg.tempo_factor_max);

        let efg_gap = efg_diff.abs();
        let margin_scale = (cfg.base_margin_scale + efg_gap * cfg.efg_margin_adjustment)
            .clamp(cfg.margin_scale_min, cfg.margin_scale_max);

        let confidence_scale = if efg_gap > 5.0 {
            (cfg.base_confidence_scale + 0.02).min(0.95)
        } else if efg_gap < 2.0 {
            (cfg.base_confidence_scale - 0.02).max(0.85)
        } else {
            cfg.base_confidence_scale
        };

        let reasoning = format!(
            "EFG diff={:+.1}% (home={:.1}%, away={:.1}%), tempo_factor={:.3}, margin_scale={:.3}",
            efg_diff, home.efg, away.efg, tempo_factor, margin_scale
        );
        debug!(%reasoning, "1H factors");

        FirstHalfFactors {
            tempo_factor: round4(tempo_factor),
            margin_scale: round4(margin_scale),
            confidence_scale: round3(confidence_scale),
            efg_differential: round2(efg_diff),
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::RatingsRow;
    use chrono::NaiveDate;

    fn make_team(efg: f64) -> TeamRatings {
        TeamRatings::from_row(RatingsRow {
            team: Some("Team".to_string()),
            as_of: NaiveDate::from_ymd_opt(2025, 1, 14),
            adj_o: Some(110.0),
            adj_d: Some(100.0),
            tempo: Some(67.0),
            rank: Some(50),
            barthag: Some(0.8),
            wab: Some(2.0),
            efg: Some(efg),
            efgd: Some(49.0),
            tor: Some(17.0),
            tord: Some(19.0),
            orb: Some(29.0),
            drb: Some(72.0),
            ftr: Some(32.0),
            ftrd: Some(30.0),
            two_pt_pct: Some(52.0),
            two_pt_pct_d: Some(48.0),
            three_pt_pct: Some(35.0),
            three_pt_pct_d: Some(33.0),
            three_pt_rate: Some(36.0),
            three_pt_rate_d: Some(36.0),
        })
        .unwrap()
    }

    fn calculator() -> FirstHalfFactorCalculator {
        FirstHalfFactorCalculator::new(FirstHalfFactorConfig::default(), LeagueAverages::default())
    }

    #[test]
    fn sharp_shooting_lifts_tempo_factor() {
        // avg EFG 54.0, four points above league average.
        let factors = calculator().calculate_factors(&make_team(56.0), &make_team(52.0));
        assert!((factors.tempo_factor - 0.50).abs() < 1e-9);
        assert!((factors.efg_differential - 4.0).abs() < 1e-9);
        assert!(factors.reasoning.contains("EFG diff=+4.0%"));
    }

    #[test]
    fn wide_gap_raises_margin_scale_and_confidence() {
        let factors = calculator().calculate_factors(&make_team(56.0), &make_team(48.0));
        // Gap 8.0 -> margin 0.50 + 0.08 clamped to 0.55, confidence 0.92.
        assert!((factors.margin_scale - 0.55).abs() < 1e-9);
        assert!((factors.confidence_scale - 0.92).abs() < 1e-9);
    }

    #[test]
    fn near_even_matchup_lowers_confidence() {
        let factors = calculator().calculate_factors(&make_team(50.5), &make_team(50.0));
        assert!((factors.confidence_scale - 0.88).abs() < 1e-9);
        assert!((factors.margin_scale - 0.505).abs() < 1e-9);
    }

    #[test]
    fn factors_are_clamped() {
        let factors = calculator().calculate_factors(&make_team(68.0), &make_team(66.0));
        assert!((factors.tempo_factor - 0.52).abs() < 1e-9);
        let factors = calculator().calculate_factors(&make_team(33.0), &make_team(31.0));
        assert!((factors.tempo_factor - 0.44).abs() < 1e-9);
    }

    #[test]
    fn disabled_returns_base_constants() {
        let calc = FirstHalfFactorCalculator::new(
            FirstHalfFactorConfig {
                enabled: false,
                ..FirstHalfFactorConfig::default()
            },
            LeagueAverages::default(),
        );
        let factors = calc.calculate_factors(&make_team(60.0), &make_team(45.0));
        assert_eq!(factors.tempo_factor, 0.48);
        assert_eq!(factors.margin_scale, 0.50);
        assert_eq!(factors.confidence_scale, 0.90);
        assert_eq!(
            factors.reasoning,
            "dynamic 1H factors disabled, using base factors"
        );
    }
}

//! Game-specific scoring variance.
//!
//! Sigma widens for three-point-heavy matchups and pace mismatches and
//! narrows for grinding, two-point games. First-half sigma runs hotter
//! than full game over the shorter sample.

use serde::Serialize;
use tracing::debug;

use crate::config::{LeagueAverages, VarianceConfig};
use crate::ratings::TeamRatings;
use crate::types::{round2, round3};

/// Breakdown of the sigma calculation for one game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct VarianceFactors {
    pub base_variance: f64,
    pub three_pt_adjustment: f64,
    pub pace_adjustment: f64,
    pub total_variance: f64,
}

impl VarianceFactors {
    pub fn sigma(&self) -> f64 {
        self.total_variance
    }
}

pub struct DynamicVarianceCalculator {
    config: VarianceConfig,
    league: LeagueAverages,
}

impl DynamicVarianceCalculator {
    pub fn new(config: VarianceConfig, league: LeagueAverages) -> Self {
        Self { config, league }
    }

    pub fn calculate_game_variance(
        &self,
        home: &TeamRatings,
        away: &TeamRatings,
    ) -> VarianceFactors {
        if !self.config.enabled {
            return VarianceFactors {
                base_variance: self.config.base_sigma,
                three_pt_adjustment: 0.0,
                pace_adjustment: 0.0,
                total_variance: self.config.base_sigma,
            };
        }

        let avg_three_pt_rate = (home.three_pt_rate + away.three_pt_rate) / 2.0;
        let three_pt_adj =
            (avg_three_pt_rate - self.league.three_pt_rate) * self.config.three_pt_variance_factor;
        let tempo_diff = (home.tempo - away.tempo).abs();
        let pace_adj = tempo_diff * self.config.pace_variance_factor;

        let total = (self.config.base_sigma + three_pt_adj + pace_adj)
            .clamp(self.config.min_sigma, self.config.max_sigma);

        debug!(
            base = self.config.base_sigma,
            three_pt_adj,
            pace_adj,
            total,
            "game variance"
        );

        VarianceFactors {
            base_variance: self.config.base_sigma,
            three_pt_adjustment: round3(three_pt_adj),
            pace_adjustment: round3(pace_adj),
            total_variance: round2(total),
        }
    }

    /// First-half sigma, capped so a max-variance game cannot exceed
    /// `max_sigma` times the multiplier.
    pub fn calculate_1h_variance(&self, factors: &VarianceFactors) -> f64 {
        let multiplier = self.config.first_half_multiplier;
        (factors.total_variance * multiplier).min(self.config.max_sigma * multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::RatingsRow;
    use chrono::NaiveDate;

    fn make_team(tempo: f64, three_pt_rate: f64) -> TeamRatings {
        TeamRatings::from_row(RatingsRow {
            team: Some("Team".to_string()),
            as_of: NaiveDate::from_ymd_opt(2025, 1, 14),
            adj_o: Some(110.0),
            adj_d: Some(100.0),
            tempo: Some(tempo),
            rank: Some(50),
            barthag: Some(0.8),
            wab: Some(2.0),
            efg: Some(51.0),
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
            three_pt_rate: Some(three_pt_rate),
            three_pt_rate_d: Some(36.0),
        })
        .unwrap()
    }

    fn calculator() -> DynamicVarianceCalculator {
        DynamicVarianceCalculator::new(VarianceConfig::default(), LeagueAverages::default())
    }

    #[test]
    fn three_ball_and_pace_mismatch_widen_sigma() {
        let home = make_team(70.0, 38.0);
        let away = make_team(65.0, 36.0);
        let factors = calculator().calculate_game_variance(&home, &away);
        assert_eq!(factors.base_variance, 11.0);
        // avg 3PR 37.0 -> +0.30, tempo gap 5.0 -> +0.50.
        assert!((factors.three_pt_adjustment - 0.30).abs() < 1e-9);
        assert!((factors.pace_adjustment - 0.50).abs() < 1e-9);
        assert!((factors.total_variance - 11.80).abs() < 1e-9);
        assert_eq!(factors.sigma(), factors.total_variance);
    }

    #[test]
    fn sigma_is_clamped_both_ways() {
        let wild = calculator().calculate_game_variance(&make_team(80.0, 50.0), &make_team(58.0, 48.0));
        assert_eq!(wild.total_variance, 14.0);
        let grind = calculator().calculate_game_variance(&make_team(62.0, 22.0), &make_team(62.0, 20.0));
        assert_eq!(grind.total_variance, 9.0);
    }

    #[test]
    fn first_half_sigma_scales_and_caps() {
        let calc = calculator();
        let factors = VarianceFactors {
            base_variance: 11.0,
            three_pt_adjustment: 0.3,
            pace_adjustment: 0.5,
            total_variance: 11.8,
        };
        assert!((calc.calculate_1h_variance(&factors) - 11.8 * 1.15).abs() < 1e-9);
        let maxed = VarianceFactors {
            total_variance: 20.0,
            ..factors
        };
        assert!((calc.calculate_1h_variance(&maxed) - 14.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn disabled_returns_base_sigma() {
        let calc = DynamicVarianceCalculator::new(
            VarianceConfig {
                enabled: false,
                ..VarianceConfig::default()
            },
            LeagueAverages::default(),
        );
        let factors = calc.calculate_game_variance(&make_team(80.0, 50.0), &make_team(58.0, 48.0));
        assert_eq!(factors.total_variance, 11.0);
        assert_eq!(factors.three_pt_adjustment, 0.0);
        assert_eq!(factors.pace_adjustment, 0.0);
    }
}

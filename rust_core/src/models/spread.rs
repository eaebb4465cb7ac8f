//! Full-game spread model.

use crate::models::base::{matchup_adjustment, statistical_confidence, BaseProjection};
use crate::models::{MarketModel, PredictionContext};
use crate::types::{round1, round2, round3, BetType, MarketPrediction};

/// Projects the home margin and quotes it as a line. Negative value means
/// home is favored.
pub struct FullGameSpreadModel;

impl MarketModel for FullGameSpreadModel {
    fn market(&self) -> BetType {
        BetType::Spread
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> MarketPrediction {
        let cfg = ctx.config;
        let projection = BaseProjection::project(ctx.home, ctx.away, &cfg.league);
        let raw_margin = projection.raw_margin();

        let hca = if ctx.is_neutral {
            0.0
        } else {
            cfg.spread.home_court_advantage
        };
        let matchup = matchup_adjustment(ctx.home, ctx.away, &cfg.league, &cfg.matchup);
        let situational = ctx.situational.spread_adjustment;

        let spread = -(raw_margin + hca + matchup + situational);

        let sigma = if cfg.variance.enabled {
            ctx.variance.sigma()
        } else {
            cfg.spread.base_sigma
        };
        let confidence =
            statistical_confidence(ctx.home, ctx.away, BetType::Spread, raw_margin, cfg);

        let reasoning = format!(
            "Margin: {:+.1} | HCA: {:+.1} | Matchup: {:+.1} | Sit: {:+.1} | Final: {:+.1}",
            raw_margin, hca, matchup, situational, spread
        );

        MarketPrediction {
            market: BetType::Spread,
            value: round1(spread),
            raw_value: spread,
            home_component: round2(projection.home_base),
            away_component: round2(projection.away_base),
            hca_applied: hca,
            calibration_applied: 0.0,
            matchup_adjustment: round2(matchup),
            situational_adjustment: round2(situational),
            sigma: round2(sigma),
            confidence: round3(confidence),
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::models::testutil::{league_average_row, make_ctx};
    use crate::ratings::TeamRatings;
    use crate::situational::SituationalAdjustment;

    fn contenders() -> (TeamRatings, TeamRatings) {
        let mut row = league_average_row("Home");
        row.adj_o = Some(118.5);
        row.adj_d = Some(94.2);
        row.tempo = Some(69.0);
        row.rank = Some(5);
        row.barthag = Some(0.95);
        let home = TeamRatings::from_row(row).unwrap();
        let mut row = league_average_row("Away");
        row.adj_o = Some(112.0);
        row.adj_d = Some(100.5);
        row.tempo = Some(67.5);
        row.rank = Some(20);
        row.barthag = Some(0.92);
        let away = TeamRatings::from_row(row).unwrap();
        (home, away)
    }

    #[test]
    fn strong_home_side_is_favored() {
        let (home, away) = contenders();
        let config = ModelConfig::default();
        let ctx = make_ctx(&home, &away, &config, false);
        let prediction = FullGameSpreadModel.predict(&ctx);
        // Margin 8.8 plus HCA 5.8, quoted from the home side.
        assert_eq!(prediction.value, -14.6);
        assert_eq!(prediction.hca_applied, 5.8);
        assert!(prediction.value < 0.0);
        assert!((0.0..=1.0).contains(&prediction.confidence));
        assert!(!prediction.reasoning.is_empty());
        assert!(prediction.reasoning.contains("HCA: +5.8"));
    }

    #[test]
    fn neutral_site_drops_the_hca() {
        let (home, away) = contenders();
        let config = ModelConfig::default();
        let ctx = make_ctx(&home, &away, &config, true);
        let prediction = FullGameSpreadModel.predict(&ctx);
        assert_eq!(prediction.hca_applied, 0.0);
        assert_eq!(prediction.value, -8.8);
    }

    #[test]
    fn situational_adjustment_moves_the_line() {
        let (home, away) = contenders();
        let config = ModelConfig::default();
        let rested = make_ctx(&home, &away, &config, false);
        let baseline = FullGameSpreadModel.predict(&rested);

        let tired = PredictionContext::assemble(
            &home,
            &away,
            false,
            SituationalAdjustment {
                spread_adjustment: -2.25,
                total_adjustment: -0.68,
                home_fatigue: -2.25,
                away_fatigue: 0.0,
            },
            &config,
        );
        let prediction = FullGameSpreadModel.predict(&tired);
        // Home on a back-to-back gives points back.
        assert!(prediction.value > baseline.value);
        assert_eq!(prediction.situational_adjustment, -2.25);
    }

    #[test]
    fn sigma_falls_back_to_base_when_variance_disabled() {
        let (home, away) = contenders();
        let mut config = ModelConfig::default();
        config.variance.enabled = false;
        let ctx = make_ctx(&home, &away, &config, false);
        let prediction = FullGameSpreadModel.predict(&ctx);
        assert_eq!(prediction.sigma, 11.0);
    }
}

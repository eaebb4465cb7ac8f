//! First-half spread and total models.
//!
//! Both markets are scaled out of the full-game projection through the
//! dynamic 1H factors rather than recomputed from scratch. The spread
//! carries its own independently calibrated HCA; the total inherits the
//! full-game value multiplicatively and keeps its calibration in variance,
//! confidence and thresholds.

use crate::models::base::{matchup_adjustment, BaseProjection};
use crate::models::total::project_total;
use crate::models::{MarketModel, PredictionContext};
use crate::types::{round1, round2, round3, BetType, MarketPrediction};

const H1_BASE_CONFIDENCE: f64 = 0.65;
const H1_CONFIDENCE_FLOOR: f64 = 0.50;
const H1_CONFIDENCE_CEIL: f64 = 0.88;
const H1_THREE_PT_VARIANCE_FACTOR: f64 = 0.08;
const H1_EFG_VARIANCE_FACTOR: f64 = 0.1;

/// First-half confidence shared by both 1H markets: a lower base than full
/// game, nudged by shooting gap, margin scale and team quality, then scaled
/// by the dynamic confidence factor inside the same band.
fn h1_confidence(ctx: &PredictionContext<'_>) -> f64 {
    let mut confidence = H1_BASE_CONFIDENCE;

    let efg_gap = (ctx.home.efg - ctx.away.efg).abs();
    if efg_gap > 5.0 {
        confidence += 0.05;
    } else if efg_gap < 2.0 {
        confidence -= 0.03;
    }

    let margin_scale = ctx.h1_factors.margin_scale;
    if margin_scale > 0.52 {
        confidence += 0.03;
    } else if margin_scale < 0.47 {
        confidence -= 0.03;
    }

    let avg_rank = f64::from(ctx.home.rank + ctx.away.rank) / 2.0;
    if avg_rank < 100.0 {
        confidence += 0.02;
    } else if avg_rank > 250.0 {
        confidence -= 0.02;
    }

    let confidence = confidence.clamp(H1_CONFIDENCE_FLOOR, H1_CONFIDENCE_CEIL);
    (confidence * ctx.h1_factors.confidence_scale).clamp(H1_CONFIDENCE_FLOOR, H1_CONFIDENCE_CEIL)
}

/// Halftime line from the scaled full-game margin. Negative value means
/// home is favored at the break.
pub struct FirstHalfSpreadModel;

impl MarketModel for FirstHalfSpreadModel {
    fn market(&self) -> BetType {
        BetType::FirstHalfSpread
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> MarketPrediction {
        let cfg = ctx.config;
        let factors = &ctx.h1_factors;
        let projection = BaseProjection::project(ctx.home, ctx.away, &cfg.league);

        let home_base_1h = projection.home_base * factors.tempo_factor;
        let away_base_1h = projection.away_base * factors.tempo_factor;
        let raw_margin_1h = home_base_1h - away_base_1h;

        let hca = if ctx.is_neutral {
            0.0
        } else {
            cfg.h1_spread.home_court_advantage
        };
        let matchup_1h = matchup_adjustment(ctx.home, ctx.away, &cfg.league, &cfg.matchup)
            * factors.margin_scale;
        let situational_1h = ctx.situational.spread_adjustment * factors.margin_scale;

        let spread_1h = -(raw_margin_1h + hca + matchup_1h + situational_1h);

        let sigma = if cfg.variance.enabled {
            ctx.h1_sigma
        } else {
            let avg_three_pt_rate = (ctx.home.three_pt_rate + ctx.away.three_pt_rate) / 2.0;
            cfg.h1_spread.base_sigma
                + (avg_three_pt_rate - cfg.league.three_pt_rate) * H1_THREE_PT_VARIANCE_FACTOR
                + (ctx.home.efg - ctx.away.efg).abs() * H1_EFG_VARIANCE_FACTOR
        };
        let confidence = h1_confidence(ctx);

        let efg_diff = ctx.home.efg - ctx.away.efg;
        let reasoning = format!(
            "1H Margin: {:+.1} | HCA: {:+.1} | EFG diff: {:+.1}% | Scale: {:.2} | Final: {:+.1}",
            raw_margin_1h, hca, efg_diff, factors.margin_scale, spread_1h
        );

        MarketPrediction {
            market: BetType::FirstHalfSpread,
            value: round1(spread_1h),
            raw_value: spread_1h,
            home_component: round2(home_base_1h),
            away_component: round2(away_base_1h),
            hca_applied: hca,
            calibration_applied: 0.0,
            matchup_adjustment: round2(matchup_1h),
            situational_adjustment: round2(situational_1h),
            sigma: round2(sigma),
            confidence: round3(confidence),
            reasoning,
        }
    }
}

/// Halftime total, scaled multiplicatively from the unrounded full-game
/// total so the two lines never drift apart.
pub struct FirstHalfTotalModel;

impl MarketModel for FirstHalfTotalModel {
    fn market(&self) -> BetType {
        BetType::FirstHalfTotal
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> MarketPrediction {
        let cfg = ctx.config;
        let factors = &ctx.h1_factors;
        let full_game = project_total(ctx);

        let hca = if ctx.is_neutral {
            0.0
        } else {
            cfg.h1_total.home_court_advantage
        };
        let total_1h = full_game.value * factors.tempo_factor + hca;

        let sigma = ctx.h1_sigma;
        let confidence = h1_confidence(ctx);

        let reasoning = format!(
            "FG Total: {:.1} | Tempo factor: {:.2} | Final: {:.1}",
            full_game.value, factors.tempo_factor, total_1h
        );

        MarketPrediction {
            market: BetType::FirstHalfTotal,
            value: round1(total_1h),
            raw_value: total_1h,
            home_component: round1(full_game.home_base * factors.tempo_factor),
            away_component: round1(full_game.away_base * factors.tempo_factor),
            hca_applied: hca,
            calibration_applied: round2(full_game.calibration * factors.tempo_factor),
            matchup_adjustment: round2(full_game.style_adjustment * factors.tempo_factor),
            situational_adjustment: round2(full_game.situational * factors.tempo_factor),
            sigma: round2(sigma),
            confidence: round3(confidence),
            reasoning,
        }
    }
}

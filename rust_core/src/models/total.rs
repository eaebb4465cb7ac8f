//! Full-game total model.
//!
//! Base efficiency-times-tempo projection plus a set of gated style bumps
//! learned from backtests, then a flat calibration. The style gates only
//! fire outside the bands where the base formula is already well behaved.

use crate::config::ModelConfig;
use crate::models::base::{statistical_confidence, BaseProjection};
use crate::models::{MarketModel, PredictionContext};
use crate::ratings::TeamRatings;
use crate::types::{round1, round2, round3, BetType, MarketPrediction};

const TEMPO_HIGH: f64 = 70.0;
const TEMPO_LOW: f64 = 66.0;
const TEMPO_ADJ_PER_POINT: f64 = 0.3;
const QUALITY_DIFF_THRESHOLD: f64 = 0.15;
const QUALITY_ADJ_FACTOR: f64 = 2.0;
const THREE_PT_HIGH: f64 = 38.0;
const THREE_PT_ADJ_FACTOR: f64 = 0.15;
const EFF_HIGH: f64 = 115.0;
const EFF_LOW: f64 = 100.0;
const EFF_ADJ_FACTOR: f64 = 0.2;
const TOR_HIGH: f64 = 20.0;
const TOR_LOW: f64 = 16.0;
const TOR_ADJ_PER_POINT: f64 = 0.3;
const FTR_HIGH: f64 = 36.0;
const FTR_ADJ_PER_POINT: f64 = 0.2;

const TEMPO_VARIANCE_FACTOR: f64 = 0.1;
const THREE_PT_VARIANCE_FACTOR: f64 = 0.1;

/// Full-game total projection, kept unrounded so the first-half total can
/// scale it without compounding rounding.
pub(crate) struct TotalProjection {
    pub base_total: f64,
    pub style_adjustment: f64,
    pub style_reasoning: String,
    pub situational: f64,
    pub calibration: f64,
    pub home_base: f64,
    pub away_base: f64,
    pub value: f64,
}

pub(crate) fn project_total(ctx: &PredictionContext<'_>) -> TotalProjection {
    let cfg = ctx.config;
    let projection = BaseProjection::project(ctx.home, ctx.away, &cfg.league);
    let base_total = projection.base_total();
    let (style_adjustment, style_reasoning) = style_adjustment(ctx.home, ctx.away);
    let situational = ctx.situational.total_adjustment;
    let calibration = cfg.total.calibration;
    let hca = if ctx.is_neutral {
        0.0
    } else {
        cfg.total.home_court_advantage
    };
    let value = base_total + style_adjustment + calibration + situational + hca;
    TotalProjection {
        base_total,
        style_adjustment,
        style_reasoning,
        situational,
        calibration,
        home_base: projection.home_base,
        away_base: projection.away_base,
        value,
    }
}

/// Gated style bumps with the reasons that fired. Reasons carry a higher
/// bar than the adjustment itself so the string only names material moves.
fn style_adjustment(home: &TeamRatings, away: &TeamRatings) -> (f64, String) {
    let mut adjustment = 0.0;
    let mut reasons: Vec<String> = Vec::new();

    let avg_tempo = (home.tempo + away.tempo) / 2.0;
    if avg_tempo > TEMPO_HIGH {
        let tempo_adj = (avg_tempo - TEMPO_HIGH) * TEMPO_ADJ_PER_POINT;
        adjustment += tempo_adj;
        if tempo_adj > 1.0 {
            reasons.push(format!("fast tempo +{tempo_adj:.1}"));
        }
    } else if avg_tempo < TEMPO_LOW {
        let tempo_adj = (avg_tempo - TEMPO_LOW) * TEMPO_ADJ_PER_POINT;
        adjustment += tempo_adj;
        if tempo_adj < -1.0 {
            reasons.push(format!("slow tempo {tempo_adj:.1}"));
        }
    }

    let quality_diff = (home.barthag - away.barthag).abs();
    if quality_diff > QUALITY_DIFF_THRESHOLD {
        // Blowouts slow down; big mismatches score under the base number.
        let quality_adj = -quality_diff * QUALITY_ADJ_FACTOR;
        adjustment += quality_adj;
        if quality_adj.abs() > 0.5 {
            reasons.push(format!("mismatch {quality_adj:.1}"));
        }
    }

    let avg_three_pt_rate = (home.three_pt_rate + away.three_pt_rate) / 2.0;
    if avg_three_pt_rate > THREE_PT_HIGH {
        let three_adj = (avg_three_pt_rate - THREE_PT_HIGH) * THREE_PT_ADJ_FACTOR;
        adjustment += three_adj;
        if three_adj > 0.5 {
            reasons.push(format!("3PT heavy +{three_adj:.1}"));
        }
    }

    let avg_offense = (home.adj_o + away.adj_o) / 2.0;
    if avg_offense > EFF_HIGH {
        let eff_adj = (avg_offense - EFF_HIGH) * EFF_ADJ_FACTOR;
        adjustment += eff_adj;
        if eff_adj > 0.5 {
            reasons.push(format!("high eff +{eff_adj:.1}"));
        }
    } else if avg_offense < EFF_LOW {
        let eff_adj = (avg_offense - EFF_LOW) * EFF_ADJ_FACTOR;
        adjustment += eff_adj;
        if eff_adj < -0.5 {
            reasons.push(format!("low eff {eff_adj:.1}"));
        }
    }

    let avg_tor = (home.tor + away.tord + away.tor + home.tord) / 4.0;
    if avg_tor > TOR_HIGH {
        let tor_adj = -(avg_tor - TOR_HIGH) * TOR_ADJ_PER_POINT;
        adjustment += tor_adj;
        if tor_adj < -0.5 {
            reasons.push(format!("high TO {tor_adj:.1}"));
        }
    } else if avg_tor < TOR_LOW {
        let tor_adj = (TOR_LOW - avg_tor) * TOR_ADJ_PER_POINT;
        adjustment += tor_adj;
        if tor_adj > 0.5 {
            reasons.push(format!("clean +{tor_adj:.1}"));
        }
    }

    let avg_ftr = (home.ftr + away.ftr) / 2.0;
    if avg_ftr > FTR_HIGH {
        let ftr_adj = (avg_ftr - FTR_HIGH) * FTR_ADJ_PER_POINT;
        adjustment += ftr_adj;
        if ftr_adj > 0.5 {
            reasons.push(format!("FT heavy +{ftr_adj:.1}"));
        }
    }

    let reasoning = if reasons.is_empty() {
        "standard".to_string()
    } else {
        reasons.join(", ")
    };
    (adjustment, reasoning)
}

fn total_variance(home: &TeamRatings, away: &TeamRatings, config: &ModelConfig) -> f64 {
    let mut variance = config.total.base_variance;
    variance += (home.tempo - away.tempo).abs() * TEMPO_VARIANCE_FACTOR;
    let avg_three_pt_rate = (home.three_pt_rate + away.three_pt_rate) / 2.0;
    if avg_three_pt_rate > config.league.three_pt_rate {
        variance += (avg_three_pt_rate - config.league.three_pt_rate) * THREE_PT_VARIANCE_FACTOR;
    }
    variance
}

/// Combined-score model. Venue-neutral by construction; the home edge moves
/// the margin, not the total.
pub struct FullGameTotalModel;

impl MarketModel for FullGameTotalModel {
    fn market(&self) -> BetType {
        BetType::Total
    }

    fn predict(&self, ctx: &PredictionContext<'_>) -> MarketPrediction {
        let cfg = ctx.config;
        let projection = project_total(ctx);

        let sigma = total_variance(ctx.home, ctx.away, cfg);
        // Edge vs the naive projection drives confidence.
        let predicted_edge = projection.value - projection.base_total;
        let confidence =
            statistical_confidence(ctx.home, ctx.away, BetType::Total, predicted_edge, cfg);

        let reasoning = format!(
            "Base: {:.1} | Adj: {:+.1} ({}) | Cal: {:+.1} | Final: {:.1}",
            projection.base_total,
            projection.style_adjustment,
            projection.style_reasoning,
            projection.calibration,
            projection.value
        );

        MarketPrediction {
            market: BetType::Total,
            value: round1(projection.value),
            raw_value: projection.value,
            home_component: round1(projection.home_base),
            away_component: round1(projection.away_base),
            hca_applied: if ctx.is_neutral {
                0.0
            } else {
                cfg.total.home_court_advantage
            },
            calibration_applied: projection.calibration,
            matchup_adjustment: round2(projection.style_adjustment),
            situational_adjustment: round2(projection.situational),
            sigma: round2(sigma),
            confidence: round3(confidence),
            reasoning,
        }
    }
}

//! Recommendation engine: gates one market's prediction against its quotes
//! and sizes the bet when every gate clears.
//!
//! Every market of every game yields a MarketDecision. Passing a gate short
//! of a bet is the common case and carries the first reason that stopped it;
//! only pipeline faults upstream are errors.

use chrono::Utc;

use crate::config::{EdgeThresholds, RecommendationConfig};
use crate::odds::{american_to_prob, ev_and_kelly, no_vig_two_way, normal_cdf};
use crate::types::{
    round1, round2, round3, BetTier, BetType, MarketDecision, MarketOdds, MarketPrediction,
    PassReason, Pick, Recommendation, StrengthTier,
};

/// Edge sign convention, fixed here and nowhere else: signed_edge =
/// model_line - market_line. Spreads: negative favors HOME (our line is
/// more home-friendly than the market's), positive favors AWAY. Totals:
/// positive favors OVER, negative favors UNDER.
fn pick_for(market: BetType, signed_edge: f64) -> Pick {
    if market.is_total() {
        if signed_edge > 0.0 {
            Pick::Over
        } else {
            Pick::Under
        }
    } else if signed_edge < 0.0 {
        Pick::Home
    } else {
        Pick::Away
    }
}

fn strength_tier(edge: f64, ladder: EdgeThresholds) -> StrengthTier {
    if edge >= ladder.max_edge {
        StrengthTier::Strong
    } else if edge >= ladder.optimal_edge {
        StrengthTier::Standard
    } else if edge >= ladder.min_edge {
        StrengthTier::Weak
    } else {
        StrengthTier::NoBet
    }
}

fn bet_tier(edge: f64, confidence: f64) -> BetTier {
    if edge >= 5.0 && confidence >= 0.75 {
        BetTier::Max
    } else if edge >= 3.0 && confidence >= 0.70 {
        BetTier::Medium
    } else {
        BetTier::Standard
    }
}

pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Run one market through the gates. Gate order: market line present,
    /// market total inside the reliable band, edge clears the ladder floor,
    /// confidence clears its own minimum (the two gates are independent,
    /// never traded off), edge strong enough to act on, picked side priced.
    pub fn decide(&self, prediction: &MarketPrediction, odds: &MarketOdds) -> MarketDecision {
        let market = prediction.market;
        let pass = |reason: PassReason| MarketDecision::Pass { market, reason };

        let Some(market_line) = odds.line_for(market) else {
            return pass(PassReason::MissingLine);
        };

        if let Some((lo, hi)) = self.config.reliable_range_for(market) {
            if !(lo..=hi).contains(&market_line) {
                tracing::debug!(
                    market = market.label(),
                    market_line,
                    "market total outside the reliable band"
                );
                return pass(PassReason::OutsideReliableRange);
            }
        }

        let signed_edge = round2(prediction.value - market_line);
        let edge = signed_edge.abs();
        let strength = strength_tier(edge, self.config.thresholds_for(market));

        if strength == StrengthTier::NoBet {
            return pass(PassReason::BelowMinEdge);
        }
        if prediction.confidence < self.config.min_confidence {
            return pass(PassReason::BelowMinConfidence);
        }
        if strength == StrengthTier::Weak {
            return pass(PassReason::WeakEdge);
        }

        let pick = pick_for(market, signed_edge);
        let (home_or_over_price, away_or_under_price) = odds.prices_for(market);
        let quoted = match pick {
            Pick::Home | Pick::Over => home_or_over_price,
            Pick::Away | Pick::Under => away_or_under_price,
        };
        let Some(pick_price) = quoted else {
            return pass(PassReason::MissingPrice);
        };

        let bet_line = match pick {
            Pick::Away => -market_line,
            _ => market_line,
        };

        // Cover probability from the edge's z-score, shrunk toward a coin
        // flip by the model's confidence. The cap keeps tail edges from
        // pricing as near-certainties.
        let z = (edge / prediction.sigma).min(self.config.z_score_cap);
        let edge_prob = normal_cdf(z).clamp(0.01, 0.99);
        let blended = 0.5 + (edge_prob - 0.5) * prediction.confidence.clamp(0.0, 1.0);
        let model_probability =
            blended.clamp(self.config.model_prob_floor, self.config.model_prob_ceil);

        let market_probability = american_to_prob(pick_price);
        let (no_vig_probability, hold_pct) =
            match (home_or_over_price, away_or_under_price) {
                (Some(a), Some(b)) => {
                    let devig = no_vig_two_way(a, b);
                    let prob = match pick {
                        Pick::Home | Pick::Over => devig.prob_a,
                        Pick::Away | Pick::Under => devig.prob_b,
                    };
                    (Some(round3(prob)), Some(round2(devig.hold_pct)))
                }
                _ => (None, None),
            };

        let (ev_pct, kelly) = ev_and_kelly(model_probability, pick_price);
        let units = (kelly * self.config.kelly_fraction * 10.0).min(self.config.max_bet_units);
        let recommended_units = round1(units).max(self.config.min_bet_units);

        MarketDecision::Bet(Recommendation {
            bet_type: market,
            pick,
            bet_line,
            model_line: prediction.value,
            market_line,
            edge,
            signed_edge,
            confidence: prediction.confidence,
            model_probability: round3(model_probability),
            market_probability: round3(market_probability),
            no_vig_probability,
            hold_pct,
            ev_pct: round2(ev_pct),
            kelly_fraction: round3(kelly),
            recommended_units,
            bet_tier: bet_tier(edge, prediction.confidence),
            strength,
            pick_price,
            created_at: Utc::now(),
            closing_line: None,
            clv_points: None,
            clv_pct: None,
        })
    }

    /// All markets of one game.
    pub fn decide_all(
        &self,
        predictions: &[MarketPrediction],
        odds: &MarketOdds,
    ) -> Vec<MarketDecision> {
        predictions
            .iter()
            .map(|prediction| self.decide(prediction, odds))
            .collect()
    }
}

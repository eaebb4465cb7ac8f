//! Slate evaluation pipeline.
//!
//! One struct owns the whole decision path for a day of games: the
//! validation gate, the ratings book, rest math, the four market models
//! and the recommendation engine. Games are independent, so a slate fans
//! out across the rayon pool and comes back in input order.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ModelConfig, PolicyConfig};
use crate::gate::{PrePredictionGate, ValidationIssue};
use crate::matching::AliasTable;
use crate::metrics::MetricsRegistry;
use crate::models::{PredictionContext, PredictionSuite};
use crate::ratings::TeamRatings;
use crate::recommend::RecommendationEngine;
use crate::situational::{RestInfo, SituationalAdjuster, SituationalAdjustment};
use crate::types::{
    GameRecord, MarketDecision, MarketOdds, MarketPrediction, PassReason, Recommendation,
};

/// One slate entry: the raw feed record, whatever the book has posted,
/// and each side's recent tip-offs (most recent first) for rest math.
#[derive(Clone, Debug, Deserialize)]
pub struct SlateGame {
    #[serde(flatten)]
    pub game: GameRecord,
    #[serde(default)]
    pub odds: Option<MarketOdds>,
    #[serde(default)]
    pub home_history: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub away_history: Vec<DateTime<Utc>>,
}

impl SlateGame {
    pub fn new(game: GameRecord) -> Self {
        Self {
            game,
            odds: None,
            home_history: Vec::new(),
            away_history: Vec::new(),
        }
    }

    pub fn with_odds(mut self, odds: MarketOdds) -> Self {
        self.odds = Some(odds);
        self
    }
}

/// Everything produced for one playable game.
#[derive(Clone, Debug, Serialize)]
pub struct GameEvaluation {
    pub game_id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub tip_off: DateTime<Utc>,
    pub local_date: NaiveDate,
    pub is_neutral: bool,
    pub warnings: Vec<ValidationIssue>,
    pub home_rest: RestInfo,
    pub away_rest: RestInfo,
    pub situational: SituationalAdjustment,
    pub predictions: Vec<MarketPrediction>,
    pub decisions: Vec<MarketDecision>,
}

impl GameEvaluation {
    /// Markets that cleared every gate.
    pub fn bets(&self) -> impl Iterator<Item = &Recommendation> {
        self.decisions.iter().filter_map(MarketDecision::as_bet)
    }
}

/// A game the gate or the ratings lookup rejected. Raw feed names are
/// kept so the problem stays traceable to its source row.
#[derive(Clone, Debug, Serialize)]
pub struct GameSkip {
    pub game_id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Pipeline outcome for one slate entry.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GameDecision {
    Evaluated(GameEvaluation),
    Skipped(GameSkip),
}

impl GameDecision {
    pub fn game_id(&self) -> Uuid {
        match self {
            GameDecision::Evaluated(eval) => eval.game_id,
            GameDecision::Skipped(skip) => skip.game_id,
        }
    }

    pub fn as_evaluated(&self) -> Option<&GameEvaluation> {
        match self {
            GameDecision::Evaluated(eval) => Some(eval),
            GameDecision::Skipped(_) => None,
        }
    }
}

/// End-to-end evaluator: gate, ratings, rest, models, recommendations.
pub struct PredictionPipeline {
    gate: PrePredictionGate,
    ratings: FxHashMap<String, TeamRatings>,
    config: ModelConfig,
    suite: PredictionSuite,
    engine: RecommendationEngine,
    situational: SituationalAdjuster,
    metrics: Arc<MetricsRegistry>,
}

impl PredictionPipeline {
    /// `ratings` must be keyed by lowercase canonical team name. The keys
    /// double as the gate's known-team set, so resolution can only land
    /// on teams the models can actually price.
    pub fn new(
        table: Arc<AliasTable>,
        policy: PolicyConfig,
        config: ModelConfig,
        ratings: FxHashMap<String, TeamRatings>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let known_teams: FxHashSet<String> = ratings.keys().cloned().collect();
        let gate = PrePredictionGate::new(table, policy).with_known_teams(known_teams);
        Self {
            gate,
            engine: RecommendationEngine::new(config.recommendation),
            situational: SituationalAdjuster::new(config.situational),
            suite: PredictionSuite::new(),
            ratings,
            config,
            metrics,
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Gate, predict and price one game.
    pub fn evaluate_game(&self, input: &SlateGame, now: DateTime<Utc>) -> GameDecision {
        let _timer = self.metrics.timer("game_evaluation_duration_seconds");

        let mut verdict = self.gate.validate(&input.game, input.odds.as_ref(), now);
        let resolved = if verdict.is_valid {
            verdict.resolved.take()
        } else {
            None
        };
        let Some(resolved) = resolved else {
            self.metrics.incr("games_skipped_total");
            tracing::warn!(
                home = %input.game.home_team,
                away = %input.game.away_team,
                errors = verdict.errors.len(),
                "game failed the gate"
            );
            return GameDecision::Skipped(GameSkip {
                game_id: input.game.id,
                home_team: input.game.home_team.clone(),
                away_team: input.game.away_team.clone(),
                errors: verdict.errors,
                warnings: verdict.warnings,
            });
        };

        let home = self.ratings.get(resolved.home_team.to_lowercase().as_str());
        let away = self.ratings.get(resolved.away_team.to_lowercase().as_str());
        let (home, away) = match (home, away) {
            (Some(home), Some(away)) => (home, away),
            (home, away) => {
                let mut errors = verdict.errors;
                if home.is_none() {
                    errors.push(ValidationIssue::error(
                        "home_team",
                        format!("no ratings row for `{}`", resolved.home_team),
                    ));
                }
                if away.is_none() {
                    errors.push(ValidationIssue::error(
                        "away_team",
                        format!("no ratings row for `{}`", resolved.away_team),
                    ));
                }
                self.metrics.incr("games_skipped_total");
                tracing::warn!(
                    home = %resolved.home_team,
                    away = %resolved.away_team,
                    "no ratings coverage for matchup"
                );
                return GameDecision::Skipped(GameSkip {
                    game_id: resolved.game_id,
                    home_team: input.game.home_team.clone(),
                    away_team: input.game.away_team.clone(),
                    errors,
                    warnings: verdict.warnings,
                });
            }
        };

        let home_rest = self.situational.compute_rest_info(
            &resolved.home_team,
            resolved.tip_off,
            &input.home_history,
        );
        let away_rest = self.situational.compute_rest_info(
            &resolved.away_team,
            resolved.tip_off,
            &input.away_history,
        );
        let situational = self.situational.compute_adjustment(&home_rest, &away_rest);

        let ctx = PredictionContext::assemble(
            home,
            away,
            resolved.is_neutral,
            situational,
            &self.config,
        );
        let predictions = self.suite.predict_all(&ctx);

        let decisions = match &input.odds {
            Some(odds) => self.engine.decide_all(&predictions, odds),
            None => predictions
                .iter()
                .map(|p| MarketDecision::Pass {
                    market: p.market,
                    reason: PassReason::MissingLine,
                })
                .collect(),
        };

        for decision in &decisions {
            match decision {
                MarketDecision::Bet(rec) => {
                    self.metrics.incr("recommendations_total");
                    tracing::info!(game = %resolved.game_id, "{}", rec.summary());
                }
                MarketDecision::Pass { market, reason } => {
                    self.metrics.incr("passes_total");
                    self.metrics
                        .incr(&format!("pass_{}_total", reason.label()));
                    tracing::debug!(
                        game = %resolved.game_id,
                        market = market.label(),
                        reason = reason.label(),
                        "market passed"
                    );
                }
            }
        }
        self.metrics.incr("games_evaluated_total");

        GameDecision::Evaluated(GameEvaluation {
            game_id: resolved.game_id,
            home_team: resolved.home_team,
            away_team: resolved.away_team,
            tip_off: resolved.tip_off,
            local_date: resolved.local_date,
            is_neutral: resolved.is_neutral,
            warnings: verdict.warnings,
            home_rest,
            away_rest,
            situational,
            predictions,
            decisions,
        })
    }

    /// Evaluate an entire slate across the rayon pool. Output order
    /// matches input order.
    pub fn run_slate(&self, games: &[SlateGame], now: DateTime<Utc>) -> Vec<GameDecision> {
        let _timer = self.metrics.timer("slate_duration_seconds");
        games
            .par_iter()
            .map(|game| self.evaluate_game(game, now))
            .collect()
    }
}

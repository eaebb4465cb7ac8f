//! Market prediction models.
//!
//! Defines the MarketModel trait, the shared per-game context the models
//! read, and the suite that runs all four markets. Models are pure
//! functions of the context; nothing here holds mutable state.

use crate::config::ModelConfig;
use crate::first_half::{FirstHalfFactorCalculator, FirstHalfFactors};
use crate::ratings::TeamRatings;
use crate::situational::SituationalAdjustment;
use crate::types::{BetType, MarketPrediction};
use crate::variance::{DynamicVarianceCalculator, VarianceFactors};

pub mod base;
pub mod first_half;
pub mod spread;
pub mod total;

pub use base::BaseProjection;
pub use first_half::{FirstHalfSpreadModel, FirstHalfTotalModel};
pub use spread::FullGameSpreadModel;
pub use total::FullGameTotalModel;

/// Everything a model may read about one game. Built once per game and
/// shared read-only by all four markets.
pub struct PredictionContext<'a> {
    pub home: &'a TeamRatings,
    pub away: &'a TeamRatings,
    pub is_neutral: bool,
    pub situational: SituationalAdjustment,
    pub variance: VarianceFactors,
    /// First-half sigma derived from the full-game variance factors.
    pub h1_sigma: f64,
    pub h1_factors: FirstHalfFactors,
    pub config: &'a ModelConfig,
}

impl<'a> PredictionContext<'a> {
    /// Runs the variance and first-half calculators and packages the
    /// context. The situational adjustment is computed upstream because it
    /// needs schedule history the models never see.
    pub fn assemble(
        home: &'a TeamRatings,
        away: &'a TeamRatings,
        is_neutral: bool,
        situational: SituationalAdjustment,
        config: &'a ModelConfig,
    ) -> Self {
        let variance_calc = DynamicVarianceCalculator::new(config.variance, config.league);
        let variance = variance_calc.calculate_game_variance(home, away);
        let h1_sigma = variance_calc.calculate_1h_variance(&variance);
        let h1_factors = FirstHalfFactorCalculator::new(config.first_half, config.league)
            .calculate_factors(home, away);
        Self {
            home,
            away,
            is_neutral,
            situational,
            variance,
            h1_sigma,
            h1_factors,
            config,
        }
    }
}

/// One prediction model per bet market.
pub trait MarketModel: Send + Sync {
    fn market(&self) -> BetType;

    fn predict(&self, ctx: &PredictionContext<'_>) -> MarketPrediction;
}

/// All four market models, run together over one context.
pub struct PredictionSuite {
    models: Vec<Box<dyn MarketModel>>,
}

impl PredictionSuite {
    pub fn new() -> Self {
        let models: Vec<Box<dyn MarketModel>> = vec![
            Box::new(FullGameSpreadModel),
            Box::new(FullGameTotalModel),
            Box::new(FirstHalfSpreadModel),
            Box::new(FirstHalfTotalModel),
        ];
        Self { models }
    }

    pub fn predict_all(&self, ctx: &PredictionContext<'_>) -> Vec<MarketPrediction> {
        self.models.iter().map(|model| model.predict(ctx)).collect()
    }

    pub fn models(&self) -> &[Box<dyn MarketModel>] {
        &self.models
    }

    pub fn register(&mut self, model: Box<dyn MarketModel>) {
        self.models.push(model);
    }
}

impl Default for PredictionSuite {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{league_average_row, make_ctx};
    use super::*;

    #[test]
    fn suite_covers_every_market_once() {
        let home = TeamRatings::from_row(league_average_row("Home")).unwrap();
        let away = TeamRatings::from_row(league_average_row("Away")).unwrap();
        let config = ModelConfig::default();
        let ctx = make_ctx(&home, &away, &config, false);
        let predictions = PredictionSuite::new().predict_all(&ctx);

        let markets: Vec<BetType> = predictions.iter().map(|p| p.market).collect();
        assert_eq!(
            markets,
            vec![
                BetType::Spread,
                BetType::Total,
                BetType::FirstHalfSpread,
                BetType::FirstHalfTotal,
            ]
        );
        for prediction in &predictions {
            assert!((0.0..=1.0).contains(&prediction.confidence));
            assert!(!prediction.reasoning.is_empty());
            assert!(prediction.sigma > 0.0);
        }
    }
}

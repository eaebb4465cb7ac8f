//! Core domain types: games, market odds, predictions, recommendations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::OddsError;

/// The four markets the pipeline prices independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetType {
    #[serde(rename = "spread")]
    Spread,
    #[serde(rename = "total")]
    Total,
    #[serde(rename = "1h_spread")]
    FirstHalfSpread,
    #[serde(rename = "1h_total")]
    FirstHalfTotal,
}

impl BetType {
    pub const ALL: [BetType; 4] = [
        BetType::Spread,
        BetType::Total,
        BetType::FirstHalfSpread,
        BetType::FirstHalfTotal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::FirstHalfSpread => "1h_spread",
            BetType::FirstHalfTotal => "1h_total",
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, BetType::Total | BetType::FirstHalfTotal)
    }

    pub fn is_first_half(&self) -> bool {
        matches!(self, BetType::FirstHalfSpread | BetType::FirstHalfTotal)
    }
}

/// Side of a market a recommendation backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pick {
    Home,
    Away,
    Over,
    Under,
}

impl Pick {
    pub fn label(&self) -> &'static str {
        match self {
            Pick::Home => "HOME",
            Pick::Away => "AWAY",
            Pick::Over => "OVER",
            Pick::Under => "UNDER",
        }
    }
}

/// Stake sizing tier from the edge/confidence ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetTier {
    Standard,
    Medium,
    Max,
}

impl BetTier {
    pub fn base_units(&self) -> f64 {
        match self {
            BetTier::Standard => 1.0,
            BetTier::Medium => 2.0,
            BetTier::Max => 3.0,
        }
    }
}

/// Edge strength against the per-market threshold ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthTier {
    NoBet,
    Weak,
    Standard,
    Strong,
}

impl StrengthTier {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::NoBet => "NO BET",
            StrengthTier::Weak => "WEAK",
            StrengthTier::Standard => "STANDARD",
            StrengthTier::Strong => "STRONG",
        }
    }
}

/// Raw scheduled game as handed over by ingestion, before resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    /// Scheduled tip-off, possibly zone-less (see the gate's time handling).
    pub commence_time: String,
    #[serde(default)]
    pub is_neutral: bool,
}

impl GameRecord {
    pub fn new(home_team: &str, away_team: &str, commence_time: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            commence_time: commence_time.to_string(),
            is_neutral: false,
        }
    }
}

/// Book odds for one game. First-half fields are routinely absent before
/// those markets open, so every field is optional; `validate` only checks
/// the fields that are present.
///
/// Lines are quoted from the home/over perspective: a negative spread means
/// the home team is favored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOdds {
    pub spread: Option<f64>,
    pub spread_home_price: Option<i32>,
    pub spread_away_price: Option<i32>,
    pub total: Option<f64>,
    pub over_price: Option<i32>,
    pub under_price: Option<i32>,
    pub spread_1h: Option<f64>,
    pub spread_1h_home_price: Option<i32>,
    pub spread_1h_away_price: Option<i32>,
    pub total_1h: Option<f64>,
    pub over_1h_price: Option<i32>,
    pub under_1h_price: Option<i32>,
}

impl MarketOdds {
    /// Range-check whatever fields are populated. Ingestion rejects rows
    /// that fail here; the gate never sees them.
    pub fn validate(&self) -> Result<(), OddsError> {
        if let Some(s) = self.spread {
            if s.abs() > 45.0 {
                return Err(OddsError::SpreadOutOfRange(s));
            }
        }
        if let Some(s) = self.spread_1h {
            if s.abs() > 45.0 {
                return Err(OddsError::Spread1hOutOfRange(s));
            }
        }
        if let Some(t) = self.total {
            if !(80.0..=220.0).contains(&t) {
                return Err(OddsError::TotalOutOfRange(t));
            }
        }
        if let Some(t) = self.total_1h {
            if !(40.0..=120.0).contains(&t) {
                return Err(OddsError::Total1hOutOfRange(t));
            }
        }
        for (field, price) in [
            ("spread_home_price", self.spread_home_price),
            ("spread_away_price", self.spread_away_price),
            ("over_price", self.over_price),
            ("under_price", self.under_price),
            ("spread_1h_home_price", self.spread_1h_home_price),
            ("spread_1h_away_price", self.spread_1h_away_price),
            ("over_1h_price", self.over_1h_price),
            ("under_1h_price", self.under_1h_price),
        ] {
            if let Some(p) = price {
                if p.abs() < 100 || p.abs() > 10_000 {
                    return Err(OddsError::PriceOutOfRange { field, price: p });
                }
            }
        }
        Ok(())
    }

    /// Quoted line for a market, if that market is open.
    pub fn line_for(&self, market: BetType) -> Option<f64> {
        match market {
            BetType::Spread => self.spread,
            BetType::Total => self.total,
            BetType::FirstHalfSpread => self.spread_1h,
            BetType::FirstHalfTotal => self.total_1h,
        }
    }

    /// Prices for both sides of a market: (home, away) for spreads,
    /// (over, under) for totals.
    pub fn prices_for(&self, market: BetType) -> (Option<i32>, Option<i32>) {
        match market {
            BetType::Spread => (self.spread_home_price, self.spread_away_price),
            BetType::Total => (self.over_price, self.under_price),
            BetType::FirstHalfSpread => {
                (self.spread_1h_home_price, self.spread_1h_away_price)
            }
            BetType::FirstHalfTotal => (self.over_1h_price, self.under_1h_price),
        }
    }
}

/// Canonical identity of a game after the gate passes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedGame {
    pub game_id: Uuid,
    pub home_team: String,
    pub away_team: String,
    /// Normalized tip-off instant.
    pub tip_off: DateTime<Utc>,
    /// Calendar date of the tip-off in the configured civil zone. Ratings
    /// as-of selection keys off this, not the UTC date.
    pub local_date: NaiveDate,
    pub is_neutral: bool,
}

/// One market model's output for one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketPrediction {
    pub market: BetType,
    /// Final line, rounded to one decimal at the very end.
    pub value: f64,
    /// Unrounded line, kept so derived markets never compound rounding.
    #[serde(skip)]
    pub raw_value: f64,
    pub home_component: f64,
    pub away_component: f64,
    pub hca_applied: f64,
    pub calibration_applied: f64,
    pub matchup_adjustment: f64,
    pub situational_adjustment: f64,
    /// Standard deviation of the outcome distribution for this market.
    pub sigma: f64,
    pub confidence: f64,
    pub reasoning: String,
}

/// A bet the engine is willing to put units on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recommendation {
    pub bet_type: BetType,
    pub pick: Pick,
    /// Line from the picked side's perspective: the market line for HOME,
    /// OVER and UNDER picks, its negation for AWAY spread picks.
    pub bet_line: f64,
    pub model_line: f64,
    pub market_line: f64,
    /// Edge magnitude in points.
    pub edge: f64,
    /// model_line - market_line, before the side is chosen.
    pub signed_edge: f64,
    pub confidence: f64,
    pub model_probability: f64,
    pub market_probability: f64,
    pub no_vig_probability: Option<f64>,
    pub hold_pct: Option<f64>,
    pub ev_pct: f64,
    pub kelly_fraction: f64,
    pub recommended_units: f64,
    pub bet_tier: BetTier,
    pub strength: StrengthTier,
    /// American price quoted for the picked side. Never a default.
    pub pick_price: i32,
    pub created_at: DateTime<Utc>,
    pub closing_line: Option<f64>,
    pub clv_points: Option<f64>,
    pub clv_pct: Option<f64>,
}

impl Recommendation {
    /// Back-fill the closing line for settlement analysis. `closing_line`
    /// is quoted from the home/over perspective like every other line;
    /// positive CLV means the bet beat the close.
    pub fn apply_closing_line(&mut self, closing_line: f64) {
        let close_for_pick = match self.pick {
            Pick::Away => -closing_line,
            _ => closing_line,
        };
        // A spread or under bettor wants the number they took to be higher
        // than the close; an over bettor wants it lower.
        let clv = match self.pick {
            Pick::Over => close_for_pick - self.bet_line,
            _ => self.bet_line - close_for_pick,
        };
        self.closing_line = Some(closing_line);
        self.clv_points = Some(round2(clv));
        self.clv_pct = if self.bet_line.abs() > f64::EPSILON {
            Some(round2(clv / self.bet_line.abs() * 100.0))
        } else {
            None
        };
    }

    /// One-line human summary for logs.
    pub fn summary(&self) -> String {
        let line = if self.bet_type.is_total() {
            format!("{:.1}", self.bet_line)
        } else {
            format!("{:+.1}", self.bet_line)
        };
        format!(
            "{} {} {} @ {} | edge {:.1} | conf {:.2} | EV {:+.1}% | {:.1}u ({})",
            self.bet_type.label(),
            self.pick.label(),
            line,
            format_price(self.pick_price),
            self.edge,
            self.confidence,
            self.ev_pct,
            self.recommended_units,
            self.strength.label(),
        )
    }
}

/// Why a market produced no recommendation. Not an error: a pass is the
/// common case and shows up in output and metrics as such.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassReason {
    MissingLine,
    MissingPrice,
    OutsideReliableRange,
    BelowMinEdge,
    WeakEdge,
    BelowMinConfidence,
}

impl PassReason {
    pub fn label(&self) -> &'static str {
        match self {
            PassReason::MissingLine => "missing_line",
            PassReason::MissingPrice => "missing_price",
            PassReason::OutsideReliableRange => "outside_reliable_range",
            PassReason::BelowMinEdge => "below_min_edge",
            PassReason::WeakEdge => "weak_edge",
            PassReason::BelowMinConfidence => "below_min_confidence",
        }
    }
}

/// Outcome for one market of one game.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum MarketDecision {
    Bet(Recommendation),
    Pass { market: BetType, reason: PassReason },
}

impl MarketDecision {
    pub fn market(&self) -> BetType {
        match self {
            MarketDecision::Bet(rec) => rec.bet_type,
            MarketDecision::Pass { market, .. } => *market,
        }
    }

    pub fn as_bet(&self) -> Option<&Recommendation> {
        match self {
            MarketDecision::Bet(rec) => Some(rec),
            MarketDecision::Pass { .. } => None,
        }
    }
}

/// American price with its conventional sign, e.g. "-105" / "+120".
pub fn format_price(price: i32) -> String {
    if price >= 0 {
        format!("+{price}")
    } else {
        price.to_string()
    }
}

/// Round to one decimal place. Applied once at the end of a model's
/// pipeline, never at intermediate steps.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_recommendation(pick: Pick, bet_type: BetType, bet_line: f64) -> Recommendation {
        Recommendation {
            bet_type,
            pick,
            bet_line,
            model_line: bet_line,
            market_line: bet_line,
            edge: 3.0,
            signed_edge: -3.0,
            confidence: 0.71,
            model_probability: 0.60,
            market_probability: 0.512,
            no_vig_probability: Some(0.50),
            hold_pct: Some(4.5),
            ev_pct: 3.2,
            kelly_fraction: 0.08,
            recommended_units: 1.2,
            bet_tier: BetTier::Standard,
            strength: StrengthTier::Standard,
            pick_price: -105,
            created_at: Utc::now(),
            closing_line: None,
            clv_points: None,
            clv_pct: None,
        }
    }

    #[test]
    fn bet_type_serde_labels() {
        assert_eq!(
            serde_json::to_string(&BetType::FirstHalfSpread).unwrap(),
            "\"1h_spread\""
        );
        let parsed: BetType = serde_json::from_str("\"1h_total\"").unwrap();
        assert_eq!(parsed, BetType::FirstHalfTotal);
        for bt in BetType::ALL {
            let json = serde_json::to_string(&bt).unwrap();
            assert_eq!(json, format!("\"{}\"", bt.label()));
        }
    }

    #[test]
    fn bet_tier_units_ladder() {
        assert_eq!(BetTier::Standard.base_units(), 1.0);
        assert_eq!(BetTier::Medium.base_units(), 2.0);
        assert_eq!(BetTier::Max.base_units(), 3.0);
    }

    #[test]
    fn odds_validate_accepts_partial_rows() {
        let odds = MarketOdds {
            spread: Some(-5.5),
            spread_home_price: Some(-105),
            spread_away_price: Some(-115),
            ..Default::default()
        };
        assert!(odds.validate().is_ok());
        assert!(MarketOdds::default().validate().is_ok());
    }

    #[test]
    fn odds_validate_rejects_out_of_range() {
        let odds = MarketOdds {
            spread: Some(-46.0),
            ..Default::default()
        };
        assert_eq!(odds.validate(), Err(OddsError::SpreadOutOfRange(-46.0)));

        let odds = MarketOdds {
            total: Some(230.0),
            ..Default::default()
        };
        assert_eq!(odds.validate(), Err(OddsError::TotalOutOfRange(230.0)));

        let odds = MarketOdds {
            over_price: Some(-99),
            ..Default::default()
        };
        assert_eq!(
            odds.validate(),
            Err(OddsError::PriceOutOfRange {
                field: "over_price",
                price: -99
            })
        );

        let odds = MarketOdds {
            under_price: Some(10_500),
            ..Default::default()
        };
        assert!(odds.validate().is_err());
    }

    #[test]
    fn odds_market_routing() {
        let odds = MarketOdds {
            spread: Some(-5.5),
            spread_home_price: Some(-105),
            spread_away_price: Some(-115),
            total_1h: Some(68.5),
            over_1h_price: Some(-110),
            under_1h_price: Some(-110),
            ..Default::default()
        };
        assert_eq!(odds.line_for(BetType::Spread), Some(-5.5));
        assert_eq!(odds.line_for(BetType::Total), None);
        assert_eq!(odds.line_for(BetType::FirstHalfTotal), Some(68.5));
        assert_eq!(odds.prices_for(BetType::Spread), (Some(-105), Some(-115)));
        assert_eq!(
            odds.prices_for(BetType::FirstHalfTotal),
            (Some(-110), Some(-110))
        );
        assert_eq!(odds.prices_for(BetType::FirstHalfSpread), (None, None));
    }

    #[test]
    fn clv_home_spread_beats_close() {
        let mut rec = make_recommendation(Pick::Home, BetType::Spread, -5.5);
        rec.apply_closing_line(-7.5);
        assert_eq!(rec.clv_points, Some(2.0));
        assert!(rec.clv_pct.unwrap() > 0.0);
    }

    #[test]
    fn clv_away_spread_loses_to_close() {
        // Away bettor took +5.5; the close was +7.5 from their side.
        let mut rec = make_recommendation(Pick::Away, BetType::Spread, 5.5);
        rec.apply_closing_line(-7.5);
        assert_eq!(rec.clv_points, Some(-2.0));
    }

    #[test]
    fn clv_over_wants_lower_number() {
        let mut rec = make_recommendation(Pick::Over, BetType::Total, 145.5);
        rec.apply_closing_line(148.5);
        assert_eq!(rec.clv_points, Some(3.0));

        let mut rec = make_recommendation(Pick::Under, BetType::Total, 145.5);
        rec.apply_closing_line(148.5);
        assert_eq!(rec.clv_points, Some(-3.0));
    }

    #[test]
    fn clv_pct_guards_pickem() {
        let mut rec = make_recommendation(Pick::Home, BetType::Spread, 0.0);
        rec.apply_closing_line(-1.5);
        assert_eq!(rec.clv_points, Some(1.5));
        assert_eq!(rec.clv_pct, None);
    }

    #[test]
    fn summary_formats_price_and_strength() {
        let rec = make_recommendation(Pick::Home, BetType::Spread, -5.5);
        let line = rec.summary();
        assert!(line.contains("spread HOME -5.5 @ -105"));
        assert!(line.contains("(STANDARD)"));

        let mut rec = make_recommendation(Pick::Over, BetType::Total, 145.5);
        rec.pick_price = 120;
        assert!(rec.summary().contains("total OVER 145.5 @ +120"));
    }

    #[test]
    fn game_record_defaults() {
        let json = r#"{"home_team":"Duke","away_team":"Kansas","commence_time":"2025-01-15T19:00:00"}"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert!(!game.is_neutral);
        assert!(!game.id.is_nil());
    }

    #[test]
    fn pass_reason_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&PassReason::OutsideReliableRange).unwrap(),
            "\"outside_reliable_range\""
        );
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round1(3.14159), 3.1);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round3(-0.0004999), -0.0);
        assert_eq!(round1(-2.25), -2.3);
    }
}

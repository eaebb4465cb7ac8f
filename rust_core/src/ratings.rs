//! Validated team ratings records.
//!
//! Every field a model reads is required at construction time. A missing
//! or out-of-range field fails `TeamRatings::from_row` with the offending
//! field name; nothing is ever defaulted. Rows arrive as all-optional
//! `RatingsRow` values from whatever store ingestion reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::RatingsError;

/// Raw ratings row as deserialized from the store, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RatingsRow {
    pub team: Option<String>,
    pub as_of: Option<NaiveDate>,
    pub adj_o: Option<f64>,
    pub adj_d: Option<f64>,
    pub tempo: Option<f64>,
    pub rank: Option<u32>,
    pub barthag: Option<f64>,
    pub wab: Option<f64>,
    pub efg: Option<f64>,
    pub efgd: Option<f64>,
    pub tor: Option<f64>,
    pub tord: Option<f64>,
    pub orb: Option<f64>,
    pub drb: Option<f64>,
    pub ftr: Option<f64>,
    pub ftrd: Option<f64>,
    pub two_pt_pct: Option<f64>,
    pub two_pt_pct_d: Option<f64>,
    pub three_pt_pct: Option<f64>,
    pub three_pt_pct_d: Option<f64>,
    pub three_pt_rate: Option<f64>,
    pub three_pt_rate_d: Option<f64>,
}

/// Complete, range-checked ratings for one team on one date.
///
/// Offensive fields are the team's own production; the `*d` twins are what
/// the team allows. Percentages and rates are on a 0-100 scale.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRatings {
    pub team: String,
    pub as_of: NaiveDate,
    pub adj_o: f64,
    pub adj_d: f64,
    pub tempo: f64,
    pub rank: u32,
    pub barthag: f64,
    pub wab: f64,
    pub efg: f64,
    pub efgd: f64,
    pub tor: f64,
    pub tord: f64,
    pub orb: f64,
    pub drb: f64,
    pub ftr: f64,
    pub ftrd: f64,
    pub two_pt_pct: f64,
    pub two_pt_pct_d: f64,
    pub three_pt_pct: f64,
    pub three_pt_pct_d: f64,
    pub three_pt_rate: f64,
    pub three_pt_rate_d: f64,
}

fn require(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<f64, RatingsError> {
    let v = value.ok_or(RatingsError::MissingField(field))?;
    if !(min..=max).contains(&v) {
        return Err(RatingsError::OutOfRange {
            field,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

impl TeamRatings {
    pub fn from_row(row: RatingsRow) -> Result<Self, RatingsError> {
        let team = row
            .team
            .filter(|t| !t.trim().is_empty())
            .ok_or(RatingsError::MissingField("team"))?;
        let as_of = row.as_of.ok_or(RatingsError::MissingField("as_of"))?;
        let rank = require("rank", row.rank.map(f64::from), 1.0, 400.0)? as u32;

        let ratings = Self {
            team,
            as_of,
            rank,
            adj_o: require("adj_o", row.adj_o, 70.0, 140.0)?,
            adj_d: require("adj_d", row.adj_d, 70.0, 140.0)?,
            tempo: require("tempo", row.tempo, 55.0, 85.0)?,
            barthag: require("barthag", row.barthag, 0.0, 1.0)?,
            wab: require("wab", row.wab, -25.0, 25.0)?,
            efg: require("efg", row.efg, 30.0, 70.0)?,
            efgd: require("efgd", row.efgd, 30.0, 70.0)?,
            tor: require("tor", row.tor, 5.0, 35.0)?,
            tord: require("tord", row.tord, 5.0, 35.0)?,
            orb: require("orb", row.orb, 10.0, 50.0)?,
            drb: require("drb", row.drb, 50.0, 90.0)?,
            ftr: require("ftr", row.ftr, 0.0, 100.0)?,
            ftrd: require("ftrd", row.ftrd, 0.0, 100.0)?,
            two_pt_pct: require("two_pt_pct", row.two_pt_pct, 0.0, 100.0)?,
            two_pt_pct_d: require("two_pt_pct_d", row.two_pt_pct_d, 0.0, 100.0)?,
            three_pt_pct: require("three_pt_pct", row.three_pt_pct, 0.0, 100.0)?,
            three_pt_pct_d: require("three_pt_pct_d", row.three_pt_pct_d, 0.0, 100.0)?,
            three_pt_rate: require("three_pt_rate", row.three_pt_rate, 0.0, 100.0)?,
            three_pt_rate_d: require("three_pt_rate_d", row.three_pt_rate_d, 0.0, 100.0)?,
        };

        let net = ratings.net_rating();
        if net.abs() > 50.0 {
            return Err(RatingsError::OutOfRange {
                field: "net_rating",
                value: net,
                min: -50.0,
                max: 50.0,
            });
        }
        Ok(ratings)
    }

    /// Points per 100 possessions better than an average opponent.
    pub fn net_rating(&self) -> f64 {
        self.adj_o - self.adj_d
    }

    /// Positive when the team forces more turnovers than it commits.
    pub fn turnover_margin(&self) -> f64 {
        self.tord - self.tor
    }

    /// Offensive rebounding rate against what the team concedes.
    pub fn rebound_margin(&self) -> f64 {
        self.orb - (100.0 - self.drb)
    }

    pub fn free_throw_margin(&self) -> f64 {
        self.ftr - self.ftrd
    }
}

//! Error taxonomy for the decision pipeline.
//!
//! Ratings completeness failures are fatal at construction time and carry
//! the offending field. Gate failures never cross the gate boundary as
//! errors; they are collected as field-scoped issues inside the verdict so
//! a slate run keeps going after one bad game. A market that clears no
//! betting threshold is not an error at all (see `MarketDecision::Pass`).

use thiserror::Error;

/// Construction-time failure for a team ratings record.
///
/// Every rating field is required and range-checked. There are no silent
/// defaults: a missing or absurd field aborts that game, not the slate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingsError {
    #[error("missing required rating field `{0}`")]
    MissingField(&'static str),

    #[error("rating field `{field}` = {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// A market odds field outside its sane range.
///
/// Raised by `MarketOdds::validate`. Ingestion rejects rows that fail
/// here before they reach the gate; odds oddities the gate itself spots
/// later are warnings, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OddsError {
    #[error("spread {0} exceeds +/-45")]
    SpreadOutOfRange(f64),

    #[error("1H spread {0} exceeds +/-45")]
    Spread1hOutOfRange(f64),

    #[error("total {0} outside [80, 220]")]
    TotalOutOfRange(f64),

    #[error("1H total {0} outside [40, 120]")]
    Total1hOutOfRange(f64),

    #[error("price {price} for `{field}` outside American odds bounds")]
    PriceOutOfRange { field: &'static str, price: i32 },
}

/// Rejected alias-table row. Construction is the only place these arise;
/// lookups on a built table are infallible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AliasTableError {
    #[error("empty team name")]
    EmptyName,

    #[error("alias `{alias}` points at unknown canonical `{canonical}`")]
    UnknownCanonical { alias: String, canonical: String },

    #[error("`{name}` already maps to `{first}`, refusing `{second}`")]
    CanonicalCollision {
        name: String,
        first: String,
        second: String,
    },
}

/// Tip-off timestamp the gate could not pin to an instant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    #[error("unparseable timestamp `{0}`")]
    Unparseable(String),

    #[error("local time `{0}` does not exist in zone {1}")]
    NonexistentLocal(String, String),
}

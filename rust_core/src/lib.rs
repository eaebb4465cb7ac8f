//! Courtside Core - College basketball betting decision pipeline.
//!
//! This crate provides:
//! - Team name resolution against a canonical alias table
//! - A pre-prediction gate that validates games before any model runs
//! - Spread, total and first-half models over tempo-based ratings
//! - Dynamic variance and rest-based situational adjustments
//! - Edge, EV and Kelly math turning predictions into sized bets
//! - Parallel slate evaluation with counters and latency histograms

pub mod config;
pub mod errors;
pub mod first_half;
pub mod gate;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod odds;
pub mod pipeline;
pub mod ratings;
pub mod recommend;
pub mod situational;
pub mod types;
pub mod variance;

pub use config::{ModelConfig, PolicyConfig};
pub use gate::{GateVerdict, PrePredictionGate, ValidationIssue};
pub use matching::{AliasTable, SharedAliasTable, TeamResolver};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use pipeline::{GameDecision, GameEvaluation, GameSkip, PredictionPipeline, SlateGame};
pub use ratings::{RatingsRow, TeamRatings};
pub use types::*;

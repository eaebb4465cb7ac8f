//! Prediction Engine Service (Rust)
//!
//! Responsibilities:
//! - Load the day's ratings snapshot, slate and optional alias overlay
//! - Gate, predict and price every game through courtside_rust_core
//! - Emit per-game decisions as a JSON report and log run metrics

mod config;
mod slate;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use courtside_rust_core::metrics::MetricsRegistry;
use courtside_rust_core::pipeline::PredictionPipeline;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::slate::RunReport;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Prediction Engine Service...");

    let config = ServiceConfig::from_env()?;
    let now = Utc::now();
    let as_of = config.as_of_date(now);
    info!(%as_of, slate = %config.slate_path, "run configuration loaded");

    let table = slate::load_alias_table(config.alias_path.as_deref().map(Path::new))?;
    info!(teams = table.len(), "alias table ready");

    let ratings = slate::load_ratings(
        Path::new(&config.ratings_path),
        as_of,
        config.policy.ratings_max_age_days,
    )?;
    info!(teams = ratings.len(), "ratings book ready");

    let games = slate::load_slate(Path::new(&config.slate_path))?;
    info!(games = games.len(), "slate loaded");

    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = PredictionPipeline::new(
        Arc::new(table),
        config.policy,
        config.model.clone(),
        ratings,
        metrics.clone(),
    );

    let decisions = pipeline.run_slate(&games, now);
    let bets: usize = decisions
        .iter()
        .filter_map(|d| d.as_evaluated())
        .map(|eval| eval.bets().count())
        .sum();
    let skipped = metrics.counter("games_skipped_total").get();
    info!(games = decisions.len(), bets, skipped, "slate evaluated");

    let snapshot = metrics.snapshot();
    info!(metrics = %serde_json::to_string(&snapshot)?, "run metrics");

    let report = RunReport {
        as_of,
        generated_at: now,
        games: games.len(),
        decisions,
        metrics: snapshot,
    };
    let out = serde_json::to_string_pretty(&report)?;
    match &config.output_path {
        Some(path) => {
            fs::write(path, &out).with_context(|| format!("writing decisions to {path}"))?;
            info!(path = %path, "decisions written");
        }
        None => println!("{out}"),
    }

    Ok(())
}

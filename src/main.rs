// =============================================================================
// Sentinel Exit Engine — Main Entry Point
// =============================================================================
//
// Wires the exit decision engine to its collaborators: the position ledger,
// the market-data and sentiment feed boundary, the decision audit log, and
// the periodic evaluation monitor.  The engine itself is pure; everything
// with a lifecycle lives here.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod audit;
mod config;
mod engine;
mod feeds;
mod ledger;
mod monitor;
mod types;

use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::audit::DecisionLog;
use crate::config::EngineConfig;
use crate::feeds::{
    InMemoryMarketData, InMemorySentimentStore, InstrumentQuote, MarketDataSource, SentimentStore,
};
use crate::ledger::{Position, PositionLedger};
use crate::types::{MarketContext, PositionSide};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Sentinel Exit Engine — Starting Up               ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("SENTINEL_CONFIG_PATH").unwrap_or_else(|_| "engine_config.json".into());

    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    info!(
        base_profit_target_pct = config.base_profit_target_pct,
        base_stop_loss_pct = config.base_stop_loss_pct,
        max_hold_hours = config.max_hold_secs / 3600,
        instruments = config.instruments.len(),
        "Exit thresholds configured"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let config = Arc::new(RwLock::new(config));
    let ledger = Arc::new(PositionLedger::new());
    let market_data = Arc::new(InMemoryMarketData::new());
    let sentiment = Arc::new(InMemorySentimentStore::new());
    let decisions = Arc::new(DecisionLog::new());

    // ── 3. Optional demo book ────────────────────────────────────────────
    // With no upstream prediction service attached, seed a small book so the
    // monitor has something to evaluate.
    let demo = std::env::var("SENTINEL_DEMO_SEED")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if demo {
        seed_demo_book(&ledger, &market_data, &sentiment)?;
        info!("Demo book seeded");
    }

    // ── 4. Evaluation monitor ────────────────────────────────────────────
    let monitor_config = config.clone();
    let monitor_ledger = ledger.clone();
    let monitor_market: Arc<dyn MarketDataSource> = market_data.clone();
    let monitor_sentiment: Arc<dyn SentimentStore> = sentiment.clone();
    let monitor_decisions = decisions.clone();
    tokio::spawn(async move {
        monitor::run_exit_monitor(
            monitor_config,
            monitor_ledger,
            monitor_market,
            monitor_sentiment,
            monitor_decisions,
        )
        .await;
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = config.read().save(&config_path) {
        error!(error = %e, "Failed to save engine config on shutdown");
    }

    info!(
        evaluations = decisions.len(),
        live_positions = ledger.evaluation_targets().len(),
        "Sentinel Exit Engine shut down complete."
    );
    Ok(())
}

/// Seed a couple of positions and matching feed data so a standalone run
/// exercises the full evaluation path.
fn seed_demo_book(
    ledger: &PositionLedger,
    market_data: &InMemoryMarketData,
    sentiment: &InMemorySentimentStore,
) -> anyhow::Result<()> {
    let now = Utc::now();

    // A confident long opened an hour ago, modestly in profit.
    let long = Position::open(
        "AAPL",
        PositionSide::Long,
        190.0,
        25,
        0.82,
        MarketContext::Bullish,
        "demo-pred-aapl",
        now - Duration::hours(1),
    )?;
    ledger.open_position(long);
    market_data.set_quote(
        "AAPL",
        InstrumentQuote {
            price: 193.4,
            rsi: Some(61.0),
            macd_signal: Some(types::MacdSignal::Bullish),
            price_trend: Some(types::PriceTrend::Bullish),
        },
    );
    sentiment.record_entry_sentiment("demo-pred-aapl", 0.45);
    sentiment.set_current_sentiment("AAPL", 0.38);

    // A shaky short that has gone nowhere since yesterday evening.
    let short = Position::open(
        "PLTR",
        PositionSide::Short,
        24.0,
        100,
        0.58,
        MarketContext::Neutral,
        "demo-pred-pltr",
        now - Duration::hours(5),
    )?;
    ledger.open_position(short);
    market_data.set_quote(
        "PLTR",
        InstrumentQuote {
            price: 24.1,
            rsi: Some(48.0),
            macd_signal: Some(types::MacdSignal::Neutral),
            price_trend: Some(types::PriceTrend::Sideways),
        },
    );
    sentiment.record_entry_sentiment("demo-pred-pltr", -0.3);
    sentiment.set_current_sentiment("PLTR", -0.25);

    Ok(())
}

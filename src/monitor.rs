// =============================================================================
// Evaluation Monitor — periodic exit evaluation over the open book
// =============================================================================
//
// Runs as a background Tokio task, waking on a fixed interval to:
//   1. Snapshot all positions still eligible for evaluation.
//   2. Assemble a MarketSnapshot per position from the feed boundary.
//      Positions with no usable market data are skipped ("evaluation
//      skipped, still open") — the engine is never called without a price.
//   3. Run the exit engine and record the evaluation in the decision log.
//   4. Act on authoritative exits through the ledger's Open -> Closing
//      compare-and-set, which guarantees at-most-once exit execution even if
//      two cycles race.
//
// The monitor is designed to be spawned once at service startup:
//
//   tokio::spawn(run_exit_monitor(
//       config, ledger, market_data, sentiment, decisions,
//   ));
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use crate::audit::{DecisionLog, EvaluationRecord};
use crate::config::EngineConfig;
use crate::engine::{self, MarketSnapshot};
use crate::feeds::{MarketDataSource, SentimentStore};
use crate::ledger::PositionLedger;

/// Interval at which the monitor evaluates open positions.
const MONITOR_INTERVAL_SECS: u64 = 30;

/// Run the evaluation monitor loop.  This function runs forever and should be
/// spawned as a background Tokio task.
pub async fn run_exit_monitor(
    config: Arc<RwLock<EngineConfig>>,
    ledger: Arc<PositionLedger>,
    market_data: Arc<dyn MarketDataSource>,
    sentiment: Arc<dyn SentimentStore>,
    decisions: Arc<DecisionLog>,
) {
    info!(
        interval_secs = MONITOR_INTERVAL_SECS,
        "exit monitor started"
    );

    let mut ticker = interval(Duration::from_secs(MONITOR_INTERVAL_SECS));

    loop {
        ticker.tick().await;
        run_evaluation_cycle(&config, &ledger, &*market_data, &*sentiment, &decisions);
    }
}

/// One full evaluation pass over the open book.  Split out of the loop so the
/// cycle semantics are testable without the timer.
pub fn run_evaluation_cycle(
    config: &RwLock<EngineConfig>,
    ledger: &PositionLedger,
    market_data: &dyn MarketDataSource,
    sentiment: &dyn SentimentStore,
    decisions: &DecisionLog,
) {
    let targets = ledger.evaluation_targets();
    if targets.is_empty() {
        debug!("exit monitor: no open positions");
        return;
    }

    // Read the config once per cycle so every position in the pass sees the
    // same thresholds.
    let cfg = config.read().clone();

    debug!(count = targets.len(), "exit monitor: evaluating positions");

    for position in &targets {
        let quote = match market_data.quote(&position.symbol) {
            Some(quote) if quote.price > 0.0 => quote,
            Some(quote) => {
                warn!(
                    id = %position.id,
                    symbol = %position.symbol,
                    price = quote.price,
                    "invalid quote price — evaluation skipped, position stays open"
                );
                continue;
            }
            None => {
                warn!(
                    id = %position.id,
                    symbol = %position.symbol,
                    "no market data — evaluation skipped, position stays open"
                );
                continue;
            }
        };

        ledger.update_price(&position.symbol, quote.price);

        let snapshot = MarketSnapshot {
            current_price: quote.price,
            rsi: quote.rsi,
            macd_signal: quote.macd_signal,
            price_trend: quote.price_trend,
            current_sentiment: sentiment.current_sentiment(&position.symbol),
            entry_sentiment: sentiment.entry_sentiment(&position.origin_prediction_id),
            now: Utc::now(),
        };

        let (signal, verdicts) = engine::evaluate_detailed(&cfg, position, &snapshot);
        decisions.push(EvaluationRecord::new(position, &signal, &verdicts));

        if signal.should_exit {
            // Only the cycle that wins the CAS executes the close.
            if !ledger.begin_close(&position.id) {
                debug!(
                    id = %position.id,
                    symbol = %position.symbol,
                    "exit signalled but position already closing — skipping"
                );
                continue;
            }

            let exit_price = signal.recommended_exit_price.unwrap_or(quote.price);
            match ledger.mark_closed(&position.id, &signal.reason.to_string(), exit_price) {
                Some(realized) => {
                    info!(
                        id = %position.id,
                        symbol = %position.symbol,
                        side = %position.side,
                        reason = %signal.reason,
                        urgency = signal.urgency,
                        exit_price,
                        realized_return_pct = format!("{realized:.2}"),
                        details = %signal.details,
                        "EXIT EXECUTED — position closed"
                    );
                }
                None => {
                    error!(
                        id = %position.id,
                        "failed to finalise close — position not in Closing state"
                    );
                }
            }
        } else if signal.urgency > 1 {
            info!(
                id = %position.id,
                symbol = %position.symbol,
                reason = %signal.reason,
                urgency = signal.urgency,
                details = %signal.details,
                "exit warning raised"
            );
        } else {
            debug!(
                id = %position.id,
                symbol = %position.symbol,
                "no exit condition met"
            );
        }
    }
}

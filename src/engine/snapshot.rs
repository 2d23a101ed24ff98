// =============================================================================
// Market Snapshot — read-only facts supplied at evaluation time
// =============================================================================
//
// Assembled by the host service from its market-data and sentiment feeds and
// handed to the engine fully formed.  Every indicator field is optional: the
// feeds must distinguish "data unavailable" from a valid zero, and conditions
// degrade to inert signals rather than failing when a field is absent.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MacdSignal, PriceTrend};

/// Current market facts about one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Last traded price.  Always present — the host skips evaluation
    /// entirely when it has no usable price.
    pub current_price: f64,
    /// Relative Strength Index in [0, 100].
    pub rsi: Option<f64>,
    pub macd_signal: Option<MacdSignal>,
    pub price_trend: Option<PriceTrend>,
    /// Latest sentiment score for the symbol, in [-1, 1].
    pub current_sentiment: Option<f64>,
    /// Sentiment score at position entry, looked up externally by the
    /// originating prediction id, in [-1, 1].
    pub entry_sentiment: Option<f64>,
    /// Evaluation wall-clock time.  Must be at or after the position's
    /// entry time.
    pub now: DateTime<Utc>,
}

impl MarketSnapshot {
    /// A snapshot carrying only a price, with every indicator unavailable.
    pub fn price_only(current_price: f64, now: DateTime<Utc>) -> Self {
        Self {
            current_price,
            rsi: None,
            macd_signal: None,
            price_trend: None,
            current_sentiment: None,
            entry_sentiment: None,
            now,
        }
    }

    /// How long the position has been held as of this snapshot.  Clamped to
    /// zero if the caller supplied an out-of-order timestamp.
    pub fn hold_duration(&self, entry_time: DateTime<Utc>) -> Duration {
        let held = self.now - entry_time;
        if held < Duration::zero() {
            Duration::zero()
        } else {
            held
        }
    }
}

// =============================================================================
// Feed Boundary — market data and sentiment collaborators
// =============================================================================
//
// The exit engine never performs I/O.  These traits are the seam where the
// host service plugs in whatever supplies prices, indicators, and sentiment
// scores.  Absence of data must be distinguishable from a valid zero, so
// every lookup returns an Option.
//
// The in-memory implementations back the demo wiring and tests; a production
// deployment substitutes real feed clients behind the same traits.
// =============================================================================

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::{MacdSignal, PriceTrend};

/// Price and indicator facts for one instrument, as last published by the
/// market-data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentQuote {
    pub price: f64,
    pub rsi: Option<f64>,
    pub macd_signal: Option<MacdSignal>,
    pub price_trend: Option<PriceTrend>,
}

impl InstrumentQuote {
    /// A bare price with no indicator data.
    pub fn price_only(price: f64) -> Self {
        Self {
            price,
            rsi: None,
            macd_signal: None,
            price_trend: None,
        }
    }
}

/// Supplies current price and technical indicators per symbol.
pub trait MarketDataSource: Send + Sync {
    /// Latest quote for `symbol`, or `None` when the feed has nothing usable.
    fn quote(&self, symbol: &str) -> Option<InstrumentQuote>;
}

/// Supplies sentiment scores: entry-time sentiment by originating prediction
/// id, current sentiment by symbol.
pub trait SentimentStore: Send + Sync {
    fn entry_sentiment(&self, prediction_id: &str) -> Option<f64>;
    fn current_sentiment(&self, symbol: &str) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Thread-safe in-memory quote table.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    quotes: RwLock<HashMap<String, InstrumentQuote>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish or replace the quote for `symbol`.
    pub fn set_quote(&self, symbol: impl Into<String>, quote: InstrumentQuote) {
        self.quotes.write().insert(symbol.into(), quote);
    }

    /// Drop the quote for `symbol`, simulating a feed outage.
    pub fn clear_quote(&self, symbol: &str) {
        self.quotes.write().remove(symbol);
    }
}

impl MarketDataSource for InMemoryMarketData {
    fn quote(&self, symbol: &str) -> Option<InstrumentQuote> {
        self.quotes.read().get(symbol).cloned()
    }
}

/// Thread-safe in-memory sentiment store.
#[derive(Debug, Default)]
pub struct InMemorySentimentStore {
    by_prediction: RwLock<HashMap<String, f64>>,
    by_symbol: RwLock<HashMap<String, f64>>,
}

impl InMemorySentimentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sentiment score attached to a prediction at entry time.
    pub fn record_entry_sentiment(&self, prediction_id: impl Into<String>, score: f64) {
        self.by_prediction.write().insert(prediction_id.into(), score);
    }

    /// Publish the latest sentiment score for a symbol.
    pub fn set_current_sentiment(&self, symbol: impl Into<String>, score: f64) {
        self.by_symbol.write().insert(symbol.into(), score);
    }
}

impl SentimentStore for InMemorySentimentStore {
    fn entry_sentiment(&self, prediction_id: &str) -> Option<f64> {
        self.by_prediction.read().get(prediction_id).copied()
    }

    fn current_sentiment(&self, symbol: &str) -> Option<f64> {
        self.by_symbol.read().get(symbol).copied()
    }
}

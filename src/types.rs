// =============================================================================
// Shared types used across the Sentinel exit engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1.0 for long, -1.0 for short. Used to sign raw price returns.
    pub fn direction(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "Long"),
            Self::Short => write!(f, "Short"),
        }
    }
}

/// Coarse market regime classification affecting exit thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketContext {
    Bullish,
    Neutral,
    Bearish,
}

impl Default for MarketContext {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for MarketContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Direction of the latest MACD crossover, as supplied by the indicator feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for MacdSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Price-trend classification over the recent lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTrend {
    StronglyBullish,
    Bullish,
    Sideways,
    Bearish,
    StronglyBearish,
}

impl std::fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StronglyBullish => write!(f, "StronglyBullish"),
            Self::Bullish => write!(f, "Bullish"),
            Self::Sideways => write!(f, "Sideways"),
            Self::Bearish => write!(f, "Bearish"),
            Self::StronglyBearish => write!(f, "StronglyBearish"),
        }
    }
}

/// Liquidity class of an instrument. Drives the patience window used by the
/// low-confidence drift rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidityClass {
    High,
    Standard,
}

impl Default for LiquidityClass {
    fn default() -> Self {
        Self::Standard
    }
}

impl std::fmt::Display for LiquidityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Standard => write!(f, "Standard"),
        }
    }
}

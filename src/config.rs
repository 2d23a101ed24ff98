// =============================================================================
// Engine Configuration — threshold tables with atomic save
// =============================================================================
//
// Central configuration hub for the Sentinel exit engine.  Every numeric
// threshold the exit conditions consult lives here, so that deployment
// profiles differ by configuration file rather than by forked code paths.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{LiquidityClass, MarketContext};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_base_profit_target_pct() -> f64 {
    3.0
}

fn default_base_stop_loss_pct() -> f64 {
    2.5
}

fn default_confidence_tiers() -> Vec<ConfidenceTier> {
    vec![
        ConfidenceTier {
            min_confidence: 0.8,
            profit_multiplier: 1.5,
            stop_multiplier: 1.4,
        },
        ConfidenceTier {
            min_confidence: 0.7,
            profit_multiplier: 1.2,
            stop_multiplier: 1.2,
        },
        ConfidenceTier {
            min_confidence: 0.6,
            profit_multiplier: 1.0,
            stop_multiplier: 1.0,
        },
        ConfidenceTier {
            min_confidence: 0.0,
            profit_multiplier: 0.8,
            stop_multiplier: 0.8,
        },
    ]
}

fn default_instruments() -> HashMap<String, InstrumentProfile> {
    let mut instruments = HashMap::new();
    // Large-cap majors: neutral multipliers, deep books.
    for symbol in ["AAPL", "MSFT", "GOOGL", "AMZN"] {
        instruments.insert(
            symbol.to_string(),
            InstrumentProfile {
                profit_multiplier: 1.0,
                stop_multiplier: 1.0,
                liquidity: LiquidityClass::High,
            },
        );
    }
    // Higher-beta names: wider profit targets.
    for symbol in ["TSLA", "NVDA"] {
        instruments.insert(
            symbol.to_string(),
            InstrumentProfile {
                profit_multiplier: 1.2,
                stop_multiplier: 1.0,
                liquidity: LiquidityClass::High,
            },
        );
    }
    // Lower-liquidity names: tighter targets and stops.
    for symbol in ["PLTR", "SOFI"] {
        instruments.insert(
            symbol.to_string(),
            InstrumentProfile {
                profit_multiplier: 0.8,
                stop_multiplier: 0.8,
                liquidity: LiquidityClass::Standard,
            },
        );
    }
    instruments
}

fn default_market_multipliers() -> MarketMultipliers {
    MarketMultipliers {
        bullish: 1.2,
        neutral: 1.0,
        bearish: 0.8,
    }
}

fn default_max_hold_secs() -> u64 {
    24 * 3600
}

fn default_patience_high_liquidity_secs() -> u64 {
    4 * 3600
}

fn default_patience_standard_secs() -> u64 {
    2 * 3600
}

// =============================================================================
// ConfidenceTier
// =============================================================================

/// One row of the confidence-tier table.  A position with
/// `confidence >= min_confidence` (checking tiers from highest to lowest)
/// picks up this tier's multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceTier {
    /// Inclusive lower bound of the tier.
    pub min_confidence: f64,

    /// Multiplier applied to the base profit target.  Higher confidence
    /// stretches the target.
    pub profit_multiplier: f64,

    /// Multiplier applied to the base stop loss.  Lower confidence tightens
    /// the stop.
    pub stop_multiplier: f64,
}

// =============================================================================
// InstrumentProfile
// =============================================================================

/// Per-symbol threshold adjustments.  Unknown symbols fall back to neutral
/// multipliers and the `Standard` liquidity class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Multiplier applied to the base profit target for this symbol.
    pub profit_multiplier: f64,

    /// Multiplier applied to the base stop loss for this symbol.
    pub stop_multiplier: f64,

    /// Liquidity class, used to pick the drift patience window.
    #[serde(default)]
    pub liquidity: LiquidityClass,
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self {
            profit_multiplier: 1.0,
            stop_multiplier: 1.0,
            liquidity: LiquidityClass::Standard,
        }
    }
}

// =============================================================================
// MarketMultipliers
// =============================================================================

/// Threshold scaling per market regime.  Applied identically to profit
/// targets and stop losses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMultipliers {
    pub bullish: f64,
    pub neutral: f64,
    pub bearish: f64,
}

impl MarketMultipliers {
    pub fn for_context(&self, context: MarketContext) -> f64 {
        match context {
            MarketContext::Bullish => self.bullish,
            MarketContext::Neutral => self.neutral,
            MarketContext::Bearish => self.bearish,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the Sentinel exit engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Threshold bases -----------------------------------------------------

    /// Base profit target as a percentage of entry price.
    #[serde(default = "default_base_profit_target_pct")]
    pub base_profit_target_pct: f64,

    /// Base stop loss as a percentage of entry price.
    #[serde(default = "default_base_stop_loss_pct")]
    pub base_stop_loss_pct: f64,

    // --- Multiplier tables ---------------------------------------------------

    /// Confidence tiers, ordered from highest `min_confidence` to lowest.
    /// The final tier should have `min_confidence: 0.0` to act as the floor.
    #[serde(default = "default_confidence_tiers")]
    pub confidence_tiers: Vec<ConfidenceTier>,

    /// Per-symbol threshold adjustments.
    #[serde(default = "default_instruments")]
    pub instruments: HashMap<String, InstrumentProfile>,

    /// Threshold scaling per market regime.
    #[serde(default = "default_market_multipliers")]
    pub market_multipliers: MarketMultipliers,

    // --- Time rules ----------------------------------------------------------

    /// Maximum hold duration before the time-limit condition fires.
    #[serde(default = "default_max_hold_secs")]
    pub max_hold_secs: u64,

    /// Drift patience window for high-liquidity instruments.
    #[serde(default = "default_patience_high_liquidity_secs")]
    pub patience_high_liquidity_secs: u64,

    /// Drift patience window for standard-liquidity instruments.
    #[serde(default = "default_patience_standard_secs")]
    pub patience_standard_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_profit_target_pct: default_base_profit_target_pct(),
            base_stop_loss_pct: default_base_stop_loss_pct(),
            confidence_tiers: default_confidence_tiers(),
            instruments: default_instruments(),
            market_multipliers: default_market_multipliers(),
            max_hold_secs: default_max_hold_secs(),
            patience_high_liquidity_secs: default_patience_high_liquidity_secs(),
            patience_standard_secs: default_patience_standard_secs(),
        }
    }
}

impl EngineConfig {
    /// Pick the confidence tier for the given prediction confidence.
    ///
    /// Tiers are checked in declaration order; the first tier whose
    /// `min_confidence` is at or below `confidence` wins.  Falls back to
    /// neutral multipliers if the table is empty or malformed.
    pub fn tier_for(&self, confidence: f64) -> (f64, f64) {
        for tier in &self.confidence_tiers {
            if confidence >= tier.min_confidence {
                return (tier.profit_multiplier, tier.stop_multiplier);
            }
        }
        (1.0, 1.0)
    }

    /// Instrument profile for `symbol`, or the neutral default for unknown
    /// symbols.
    pub fn instrument(&self, symbol: &str) -> InstrumentProfile {
        self.instruments.get(symbol).cloned().unwrap_or_default()
    }

    /// Drift patience window for the given liquidity class.
    pub fn patience_window_secs(&self, liquidity: LiquidityClass) -> u64 {
        match liquidity {
            LiquidityClass::High => self.patience_high_liquidity_secs,
            LiquidityClass::Standard => self.patience_standard_secs,
        }
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            base_profit_target_pct = config.base_profit_target_pct,
            base_stop_loss_pct = config.base_stop_loss_pct,
            max_hold_secs = config.max_hold_secs,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        // Atomic write: write to a temporary sibling file, then rename.
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}

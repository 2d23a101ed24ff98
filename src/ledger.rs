// =============================================================================
// Position Ledger — state machine for open / closing / closed trades
// =============================================================================
//
// Life-cycle:
//   Open  ->  Closing  ->  Closed
//
// The Open -> Closing transition is a compare-and-set owned by this ledger.
// Exactly one caller wins it, which guarantees at-most-once exit execution
// even if two evaluation cycles race on the same position.  The exit engine
// itself never writes here; it only reads position snapshots.
//
// Thread-safety: all mutable state is behind `parking_lot::RwLock`.
// =============================================================================

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{MarketContext, PositionSide};

// ---------------------------------------------------------------------------
// Position model
// ---------------------------------------------------------------------------

/// Current status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closing,
    Closed,
}

impl std::fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// A single tracked position under exit evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: f64,
    /// Latest observed price, refreshed by the monitor each cycle.
    #[serde(default)]
    pub current_price: f64,
    pub quantity: u32,
    /// Confidence of the originating prediction, in [0, 1].  Immutable.
    pub confidence: f64,
    /// Market regime snapshot supplied by the caller at open time.
    pub market_context: MarketContext,
    pub entry_time: DateTime<Utc>,
    /// Back-reference to the prediction that opened this position.  Used only
    /// to look up entry-time sentiment in the external sentiment store.
    pub origin_prediction_id: String,
    pub status: PositionStatus,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_reason: Option<String>,
    /// Signed return (percent) realised at close.
    #[serde(default)]
    pub realized_return_pct: f64,
}

impl Position {
    /// Construct a new open position, validating the invariants the exit
    /// engine relies on.  Invalid inputs are a caller programming error and
    /// are rejected here, not inside the engine.
    pub fn open(
        symbol: impl Into<String>,
        side: PositionSide,
        entry_price: f64,
        quantity: u32,
        confidence: f64,
        market_context: MarketContext,
        origin_prediction_id: impl Into<String>,
        entry_time: DateTime<Utc>,
    ) -> Result<Self> {
        if entry_price <= 0.0 || !entry_price.is_finite() {
            bail!("entry_price must be a positive finite number, got {entry_price}");
        }
        if quantity == 0 {
            bail!("quantity must be positive");
        }
        if !(0.0..=1.0).contains(&confidence) {
            bail!("confidence must be in [0, 1], got {confidence}");
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            entry_price,
            current_price: entry_price,
            quantity,
            confidence,
            market_context,
            entry_time,
            origin_prediction_id: origin_prediction_id.into(),
            status: PositionStatus::Open,
            closed_at: None,
            close_reason: None,
            realized_return_pct: 0.0,
        })
    }
}

// ---------------------------------------------------------------------------
// Position Ledger
// ---------------------------------------------------------------------------

/// Thread-safe ledger that owns the lists of live and closed positions.
pub struct PositionLedger {
    /// Positions with status `Open` or `Closing`.
    live: RwLock<Vec<Position>>,
    closed: RwLock<Vec<Position>>,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            live: RwLock::new(Vec::new()),
            closed: RwLock::new(Vec::new()),
        }
    }

    // -------------------------------------------------------------------------
    // Open a new position
    // -------------------------------------------------------------------------

    /// Register a freshly opened position and return its UUID.
    pub fn open_position(&self, position: Position) -> String {
        let id = position.id.clone();

        info!(
            id = %id,
            symbol = %position.symbol,
            side = %position.side,
            entry_price = position.entry_price,
            quantity = position.quantity,
            confidence = position.confidence,
            market_context = %position.market_context,
            "position opened"
        );

        self.live.write().push(position);
        id
    }

    // -------------------------------------------------------------------------
    // Price updates
    // -------------------------------------------------------------------------

    /// Refresh `current_price` for every live position matching `symbol`.
    pub fn update_price(&self, symbol: &str, current_price: f64) {
        let mut positions = self.live.write();
        for pos in positions.iter_mut().filter(|p| p.symbol == symbol) {
            pos.current_price = current_price;
        }
    }

    // -------------------------------------------------------------------------
    // Close state machine
    // -------------------------------------------------------------------------

    /// Atomically transition a position from `Open` to `Closing`.
    ///
    /// Returns `true` only for the caller that wins the transition; a
    /// position already `Closing` or `Closed` (or unknown) returns `false`.
    /// This is the at-most-once guard for exit execution.
    pub fn begin_close(&self, id: &str) -> bool {
        let mut positions = self.live.write();
        match positions.iter_mut().find(|p| p.id == id) {
            Some(pos) if pos.status == PositionStatus::Open => {
                pos.status = PositionStatus::Closing;
                info!(id = %id, symbol = %pos.symbol, "position transitioned Open -> Closing");
                true
            }
            Some(pos) => {
                warn!(
                    id = %id,
                    status = %pos.status,
                    "begin_close rejected — position is not Open"
                );
                false
            }
            None => false,
        }
    }

    /// Revert a `Closing` position back to `Open` (e.g. the close order was
    /// rejected downstream).  Returns `false` if the position is not in the
    /// `Closing` state.
    pub fn abort_close(&self, id: &str) -> bool {
        let mut positions = self.live.write();
        match positions.iter_mut().find(|p| p.id == id) {
            Some(pos) if pos.status == PositionStatus::Closing => {
                pos.status = PositionStatus::Open;
                warn!(id = %id, symbol = %pos.symbol, "close aborted — position reverted to Open");
                true
            }
            _ => false,
        }
    }

    /// Finalise a `Closing` position and move it to the closed list.
    ///
    /// Returns the realised signed return (percent) if the position was in
    /// the `Closing` state, or `None` otherwise.  Callers must win
    /// `begin_close` first.
    pub fn mark_closed(&self, id: &str, reason: &str, close_price: f64) -> Option<f64> {
        let mut live = self.live.write();
        let idx = live
            .iter()
            .position(|p| p.id == id && p.status == PositionStatus::Closing)?;
        let mut pos = live.remove(idx);

        let raw = (close_price - pos.entry_price) / pos.entry_price * 100.0;
        let realized = pos.side.direction() * raw;

        pos.current_price = close_price;
        pos.status = PositionStatus::Closed;
        pos.closed_at = Some(Utc::now());
        pos.close_reason = Some(reason.to_string());
        pos.realized_return_pct = realized;

        info!(
            id,
            reason,
            close_price,
            realized_return_pct = realized,
            "position closed"
        );

        self.closed.write().push(pos);
        Some(realized)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Snapshot of positions still eligible for evaluation (status `Open`).
    pub fn evaluation_targets(&self) -> Vec<Position> {
        self.live
            .read()
            .iter()
            .filter(|p| p.status == PositionStatus::Open)
            .cloned()
            .collect()
    }

    /// Snapshot of all live positions, including those mid-close.
    pub fn get_live_positions(&self) -> Vec<Position> {
        self.live.read().clone()
    }

    /// Return the most recent `count` closed positions (newest first).
    pub fn get_closed_positions(&self, count: usize) -> Vec<Position> {
        let closed = self.closed.read();
        closed.iter().rev().take(count).cloned().collect()
    }
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PositionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live_count = self.live.read().len();
        let closed_count = self.closed.read().len();
        f.debug_struct("PositionLedger")
            .field("live_positions", &live_count)
            .field("closed_positions", &closed_count)
            .finish()
    }
}

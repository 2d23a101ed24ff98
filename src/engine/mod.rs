// =============================================================================
// Exit Decision Engine
// =============================================================================
//
// A pure, synchronous decision function over a position snapshot plus a small
// bundle of current market signals.  Six independent exit conditions each
// produce a typed signal; a deterministic arbitration rule selects the single
// authoritative decision.  The engine performs no I/O and holds no state.

pub mod arbiter;
pub mod conditions;
pub mod signal;
pub mod snapshot;
pub mod thresholds;

pub use arbiter::{evaluate, evaluate_all, evaluate_detailed};
pub use conditions::ExitCondition;
pub use signal::{ExitReason, ExitSignal};
pub use snapshot::MarketSnapshot;

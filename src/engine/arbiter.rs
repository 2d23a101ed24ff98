// =============================================================================
// Arbitration Engine — one authoritative decision per evaluation call
// =============================================================================
//
// Runs all six conditions against the same (Position, MarketSnapshot) pair,
// partitions the results into exits and warnings, and selects:
//
//   1. The highest-(priority, urgency) exiting signal, ties broken by the
//      fixed evaluation order — the authoritative decision.
//   2. Otherwise the highest-urgency warning — informational only.
//   3. Otherwise the canonical HOLD signal.
//
// Condition priority strictly dominates urgency, so a stop-loss exit always
// beats a profit-target exit no matter what urgencies the two carry.  The
// whole function is pure and deterministic: repeated calls with the same
// inputs return identical results.
// =============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::conditions::ExitCondition;
use crate::engine::signal::ExitSignal;
use crate::engine::snapshot::MarketSnapshot;
use crate::ledger::Position;

/// Evaluate every exit condition and return the authoritative signal.
pub fn evaluate(
    config: &EngineConfig,
    position: &Position,
    snapshot: &MarketSnapshot,
) -> ExitSignal {
    let (decision, _) = evaluate_detailed(config, position, snapshot);
    decision
}

/// Evaluate every exit condition, returning both the authoritative signal
/// and the per-condition verdicts (for audit logging).
pub fn evaluate_detailed(
    config: &EngineConfig,
    position: &Position,
    snapshot: &MarketSnapshot,
) -> (ExitSignal, Vec<(ExitCondition, ExitSignal)>) {
    let verdicts: Vec<(ExitCondition, ExitSignal)> = ExitCondition::EVALUATION_ORDER
        .iter()
        .map(|condition| (*condition, condition.evaluate(position, snapshot, config)))
        .collect();

    for (condition, signal) in &verdicts {
        debug!(
            position_id = %position.id,
            symbol = %position.symbol,
            condition = %condition,
            should_exit = signal.should_exit,
            urgency = signal.urgency,
            details = %signal.details,
            "condition evaluated"
        );
    }

    let decision = arbitrate(&verdicts);
    (decision, verdicts)
}

/// Select the single authoritative signal from a set of condition verdicts.
///
/// Exposed separately so the tie-break rule can be exercised directly with
/// fabricated signal combinations that a single price can never produce.
pub fn arbitrate(verdicts: &[(ExitCondition, ExitSignal)]) -> ExitSignal {
    let mut exiting: Vec<&(ExitCondition, ExitSignal)> =
        verdicts.iter().filter(|(_, s)| s.should_exit).collect();

    if !exiting.is_empty() {
        // Stable sort: equal (priority, urgency) keys keep evaluation order.
        exiting.sort_by(|(ca, sa), (cb, sb)| {
            (cb.priority(), sb.urgency).cmp(&(ca.priority(), sa.urgency))
        });
        return exiting[0].1.clone();
    }

    // No exits: surface the most urgent warning, first-in-order on ties.
    let mut best: Option<&ExitSignal> = None;
    for (_, signal) in verdicts {
        if !signal.should_exit && signal.urgency > 1 {
            if best.map_or(true, |b| signal.urgency > b.urgency) {
                best = Some(signal);
            }
        }
    }

    match best {
        Some(warning) => warning.clone(),
        None => ExitSignal::hold(),
    }
}

/// Convenience wrapper: evaluate a batch of positions against per-symbol
/// snapshots.  No cross-position semantics — each position is independent.
/// A position whose symbol has no snapshot receives an inert signal.
pub fn evaluate_all(
    config: &EngineConfig,
    positions: &[Position],
    snapshots: &HashMap<String, MarketSnapshot>,
) -> Vec<ExitSignal> {
    positions
        .iter()
        .map(|position| match snapshots.get(&position.symbol) {
            Some(snapshot) => evaluate(config, position, snapshot),
            None => ExitSignal::inert(format!("no market snapshot for {}", position.symbol)),
        })
        .collect()
}

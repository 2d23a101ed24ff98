// =============================================================================
// Decision Audit Log — record of every exit evaluation
// =============================================================================
//
// Every evaluation cycle produces one record per position: the verdict from
// each condition plus the authoritative decision the arbiter selected.  The
// log is a bounded in-memory ring so a long-running monitor cannot grow
// without limit.
// =============================================================================

use std::collections::VecDeque;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::engine::conditions::ExitCondition;
use crate::engine::signal::ExitSignal;
use crate::ledger::Position;

/// Maximum number of evaluation records to retain.
const MAX_RECORDS: usize = 200;

/// One condition's verdict inside an evaluation record.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionVerdict {
    pub condition: ExitCondition,
    pub should_exit: bool,
    pub urgency: u8,
    pub confidence: f64,
    pub details: String,
}

/// Complete auditable record of one exit evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    /// Unique identifier for this record (UUID v4).
    pub id: String,

    pub position_id: String,
    pub symbol: String,

    /// The authoritative signal the arbiter selected.
    pub decision: ExitSignal,

    /// Verdicts from every condition, in evaluation order.
    pub verdicts: Vec<ConditionVerdict>,

    /// ISO 8601 timestamp of when this evaluation ran.
    pub evaluated_at: String,
}

impl EvaluationRecord {
    pub fn new(
        position: &Position,
        decision: &ExitSignal,
        verdicts: &[(ExitCondition, ExitSignal)],
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            position_id: position.id.clone(),
            symbol: position.symbol.clone(),
            decision: decision.clone(),
            verdicts: verdicts
                .iter()
                .map(|(condition, signal)| ConditionVerdict {
                    condition: *condition,
                    should_exit: signal.should_exit,
                    urgency: signal.urgency,
                    confidence: signal.confidence,
                    details: signal.details.clone(),
                })
                .collect(),
            evaluated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Bounded ring of recent evaluation records.
#[derive(Debug, Default)]
pub struct DecisionLog {
    records: RwLock<VecDeque<EvaluationRecord>>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest once the ring is full.
    pub fn push(&self, record: EvaluationRecord) {
        let mut records = self.records.write();
        if records.len() >= MAX_RECORDS {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Return the most recent `count` records (newest first).
    pub fn recent(&self, count: usize) -> Vec<EvaluationRecord> {
        let records = self.records.read();
        records.iter().rev().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

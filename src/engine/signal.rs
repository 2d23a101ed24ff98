// =============================================================================
// Exit Signals — the typed result of one condition's evaluation
// =============================================================================

use serde::{Deserialize, Serialize};

/// Why a condition wants (or does not want) the position closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    ProfitTarget,
    TimeLimit,
    SentimentReversal,
    TechnicalBreakdown,
    RiskManagement,
    NoExit,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLoss => write!(f, "StopLoss"),
            Self::ProfitTarget => write!(f, "ProfitTarget"),
            Self::TimeLimit => write!(f, "TimeLimit"),
            Self::SentimentReversal => write!(f, "SentimentReversal"),
            Self::TechnicalBreakdown => write!(f, "TechnicalBreakdown"),
            Self::RiskManagement => write!(f, "RiskManagement"),
            Self::NoExit => write!(f, "NoExit"),
        }
    }
}

/// One condition's opinion on whether the position should be closed now.
///
/// Signals are ephemeral: created fresh on every evaluation call and never
/// persisted by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitSignal {
    pub should_exit: bool,
    pub reason: ExitReason,
    /// 1..5, where 5 means exit immediately.
    pub urgency: u8,
    /// How sure the condition is of its verdict, in [0, 1].
    pub confidence: f64,
    /// Price at which to exit.  Defaults to the evaluation price on exits.
    pub recommended_exit_price: Option<f64>,
    /// Human-readable justification.  Never parsed by callers.
    pub details: String,
}

impl ExitSignal {
    /// The canonical HOLD signal: no condition has an opinion.
    pub fn hold() -> Self {
        Self {
            should_exit: false,
            reason: ExitReason::NoExit,
            urgency: 1,
            confidence: 0.0,
            recommended_exit_price: None,
            details: "no exit condition met".to_string(),
        }
    }

    /// Explicit "no opinion" signal for a condition whose required data is
    /// unavailable.  Absence of data is never a failure.
    pub fn inert(details: impl Into<String>) -> Self {
        Self {
            should_exit: false,
            reason: ExitReason::NoExit,
            urgency: 1,
            confidence: 0.0,
            recommended_exit_price: None,
            details: details.into(),
        }
    }

    /// An authoritative exit recommendation.
    pub fn exit(
        reason: ExitReason,
        urgency: u8,
        confidence: f64,
        exit_price: f64,
        details: impl Into<String>,
    ) -> Self {
        Self {
            should_exit: true,
            reason,
            urgency: urgency.clamp(1, 5),
            confidence: confidence.clamp(0.0, 1.0),
            recommended_exit_price: Some(exit_price),
            details: details.into(),
        }
    }

    /// A non-exiting warning: the condition is watching but not acting.
    pub fn warning(
        reason: ExitReason,
        urgency: u8,
        confidence: f64,
        details: impl Into<String>,
    ) -> Self {
        Self {
            should_exit: false,
            reason,
            urgency: urgency.clamp(1, 5),
            confidence: confidence.clamp(0.0, 1.0),
            recommended_exit_price: None,
            details: details.into(),
        }
    }
}

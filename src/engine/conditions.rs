// =============================================================================
// Exit Conditions — six independent evaluators over one position snapshot
// =============================================================================
//
// Each condition is a pure function (Position, MarketSnapshot, EngineConfig)
// -> ExitSignal.  A condition whose required snapshot data is missing returns
// an explicit inert signal — absence of data is "no opinion", never failure.
//
// The set is closed: a tagged enum evaluated by a single arbitration loop,
// so the compiler checks exhaustiveness and there is no virtual dispatch.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::engine::signal::{ExitReason, ExitSignal};
use crate::engine::snapshot::MarketSnapshot;
use crate::engine::thresholds::{profit_target_pct, signed_return_pct, stop_loss_pct};
use crate::ledger::Position;
use crate::types::{MacdSignal, PositionSide, PriceTrend};

// =============================================================================
// Constants
// =============================================================================

/// Fraction of a threshold at which a non-exiting warning is raised.
const WARNING_FRACTION: f64 = 0.8;

/// RSI level that counts as a breakdown indicator on its own.
const RSI_HARD_OVERBOUGHT: f64 = 80.0;
const RSI_HARD_OVERSOLD: f64 = 20.0;

/// RSI level that counts as a breakdown indicator only when the MACD signal
/// opposes the position as well.
const RSI_SOFT_OVERBOUGHT: f64 = 70.0;
const RSI_SOFT_OVERSOLD: f64 = 30.0;

/// Absolute sentiment shift (entry vs. now) that triggers a reversal exit.
const SENTIMENT_REVERSAL_DELTA: f64 = 0.4;

/// Confidence below which the drift rule applies.
const LOW_CONFIDENCE_CEILING: f64 = 0.65;

/// Absolute return (percent) inside which a position counts as drifting.
const DRIFT_BAND_PCT: f64 = 1.0;

// =============================================================================
// ExitCondition
// =============================================================================

/// The closed set of exit conditions, in fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitCondition {
    StopLoss,
    TechnicalBreakdown,
    ProfitTarget,
    SentimentReversal,
    RiskManagement,
    TimeLimit,
}

impl ExitCondition {
    /// Fixed evaluation order.  Arbitration tie-breaks fall back to this
    /// order, making the whole decision deterministic.
    pub const EVALUATION_ORDER: [ExitCondition; 6] = [
        ExitCondition::StopLoss,
        ExitCondition::TechnicalBreakdown,
        ExitCondition::ProfitTarget,
        ExitCondition::SentimentReversal,
        ExitCondition::RiskManagement,
        ExitCondition::TimeLimit,
    ];

    /// Arbitration priority.  Strictly dominates signal urgency: a
    /// stop-loss exit always beats a profit-target exit.
    pub fn priority(self) -> u8 {
        match self {
            Self::StopLoss => 5,
            Self::TechnicalBreakdown => 4,
            Self::ProfitTarget => 3,
            Self::SentimentReversal => 3,
            Self::RiskManagement => 2,
            Self::TimeLimit => 2,
        }
    }

    /// Evaluate this condition against the position and snapshot.
    pub fn evaluate(
        self,
        position: &Position,
        snapshot: &MarketSnapshot,
        config: &EngineConfig,
    ) -> ExitSignal {
        match self {
            Self::StopLoss => check_stop_loss(position, snapshot, config),
            Self::TechnicalBreakdown => check_technical_breakdown(position, snapshot),
            Self::ProfitTarget => check_profit_target(position, snapshot, config),
            Self::SentimentReversal => check_sentiment_reversal(position, snapshot),
            Self::RiskManagement => check_risk_management(position, snapshot, config),
            Self::TimeLimit => check_time_limit(position, snapshot, config),
        }
    }
}

impl std::fmt::Display for ExitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLoss => write!(f, "StopLoss"),
            Self::TechnicalBreakdown => write!(f, "TechnicalBreakdown"),
            Self::ProfitTarget => write!(f, "ProfitTarget"),
            Self::SentimentReversal => write!(f, "SentimentReversal"),
            Self::RiskManagement => write!(f, "RiskManagement"),
            Self::TimeLimit => write!(f, "TimeLimit"),
        }
    }
}

// =============================================================================
// Stop Loss
// =============================================================================

fn check_stop_loss(
    position: &Position,
    snapshot: &MarketSnapshot,
    config: &EngineConfig,
) -> ExitSignal {
    let loss_pct = -signed_return_pct(position, snapshot.current_price);
    let threshold = stop_loss_pct(config, position, position.market_context);

    if loss_pct >= threshold {
        // Scale confidence 0.95 -> 1.0 with the size of the breach.
        let overshoot = ((loss_pct / threshold) - 1.0).clamp(0.0, 1.0);
        let confidence = 0.95 + 0.05 * overshoot;
        return ExitSignal::exit(
            ExitReason::StopLoss,
            5,
            confidence,
            snapshot.current_price,
            format!(
                "loss {loss_pct:.2}% breached stop threshold {threshold:.2}% for {} {}",
                position.side, position.symbol
            ),
        );
    }

    if loss_pct >= WARNING_FRACTION * threshold {
        return ExitSignal::warning(
            ExitReason::StopLoss,
            3,
            0.6,
            format!("loss {loss_pct:.2}% approaching stop threshold {threshold:.2}%"),
        );
    }

    ExitSignal::hold()
}

// =============================================================================
// Profit Target
// =============================================================================

fn check_profit_target(
    position: &Position,
    snapshot: &MarketSnapshot,
    config: &EngineConfig,
) -> ExitSignal {
    let gain_pct = signed_return_pct(position, snapshot.current_price);
    let target = profit_target_pct(config, position, position.market_context);

    if gain_pct >= target {
        // Well beyond target: take the profit before it evaporates.
        let urgency = if gain_pct >= 1.5 * target { 5 } else { 4 };
        return ExitSignal::exit(
            ExitReason::ProfitTarget,
            urgency,
            0.9,
            snapshot.current_price,
            format!(
                "gain {gain_pct:.2}% reached profit target {target:.2}% for {} {}",
                position.side, position.symbol
            ),
        );
    }

    if gain_pct >= WARNING_FRACTION * target {
        return ExitSignal::warning(
            ExitReason::ProfitTarget,
            2,
            0.5,
            format!("gain {gain_pct:.2}% nearing profit target {target:.2}%"),
        );
    }

    ExitSignal::hold()
}

// =============================================================================
// Time Limit
// =============================================================================

fn check_time_limit(
    position: &Position,
    snapshot: &MarketSnapshot,
    config: &EngineConfig,
) -> ExitSignal {
    let held_secs = snapshot.hold_duration(position.entry_time).num_seconds() as u64;
    let max_hold = config.max_hold_secs;

    if held_secs >= max_hold {
        // Exit confidence tracks the prediction confidence, floored at 0.4.
        let confidence = (position.confidence * 0.8).max(0.4);
        return ExitSignal::exit(
            ExitReason::TimeLimit,
            3,
            confidence,
            snapshot.current_price,
            format!(
                "held {}h, exceeds {}h limit",
                held_secs / 3600,
                max_hold / 3600
            ),
        );
    }

    if (held_secs as f64) >= WARNING_FRACTION * max_hold as f64 {
        return ExitSignal::warning(
            ExitReason::TimeLimit,
            2,
            0.4,
            format!(
                "held {}h of {}h limit",
                held_secs / 3600,
                max_hold / 3600
            ),
        );
    }

    ExitSignal::hold()
}

// =============================================================================
// Sentiment Reversal
// =============================================================================

fn check_sentiment_reversal(position: &Position, snapshot: &MarketSnapshot) -> ExitSignal {
    let (entry, current) = match (snapshot.entry_sentiment, snapshot.current_sentiment) {
        (Some(entry), Some(current)) => (entry, current),
        _ => return ExitSignal::inert("sentiment history unavailable"),
    };

    let delta = current - entry;
    let reversed = match position.side {
        PositionSide::Long => delta <= -SENTIMENT_REVERSAL_DELTA,
        PositionSide::Short => delta >= SENTIMENT_REVERSAL_DELTA,
    };

    if reversed {
        let magnitude = delta.abs();
        let urgency = if magnitude >= 2.0 * SENTIMENT_REVERSAL_DELTA {
            4
        } else {
            3
        };
        let confidence = (0.6 + 0.5 * magnitude).min(0.95);
        return ExitSignal::exit(
            ExitReason::SentimentReversal,
            urgency,
            confidence,
            snapshot.current_price,
            format!(
                "sentiment shifted {delta:+.2} against {} position ({entry:+.2} -> {current:+.2})",
                position.side
            ),
        );
    }

    ExitSignal::hold()
}

// =============================================================================
// Technical Breakdown
// =============================================================================

fn check_technical_breakdown(position: &Position, snapshot: &MarketSnapshot) -> ExitSignal {
    if snapshot.rsi.is_none() && snapshot.macd_signal.is_none() && snapshot.price_trend.is_none() {
        return ExitSignal::inert("no technical indicators available");
    }

    let is_long = position.side == PositionSide::Long;
    let opposing_macd = matches!(
        (position.side, snapshot.macd_signal),
        (PositionSide::Long, Some(MacdSignal::Bearish))
            | (PositionSide::Short, Some(MacdSignal::Bullish))
    );

    let mut indicators: Vec<String> = Vec::new();

    if let Some(rsi) = snapshot.rsi {
        let hard = if is_long {
            rsi > RSI_HARD_OVERBOUGHT
        } else {
            rsi < RSI_HARD_OVERSOLD
        };
        let soft = if is_long {
            rsi > RSI_SOFT_OVERBOUGHT
        } else {
            rsi < RSI_SOFT_OVERSOLD
        };

        if hard {
            indicators.push(format!("RSI {rsi:.1} at extreme against {}", position.side));
        } else if soft && opposing_macd {
            indicators.push(format!("RSI {rsi:.1} elevated with opposing MACD"));
        }
    }

    if opposing_macd {
        indicators.push(format!(
            "MACD {} against {} position",
            snapshot.macd_signal.map(|m| m.to_string()).unwrap_or_default(),
            position.side
        ));
    }

    let opposing_trend = matches!(
        (position.side, snapshot.price_trend),
        (PositionSide::Long, Some(PriceTrend::StronglyBearish))
            | (PositionSide::Short, Some(PriceTrend::StronglyBullish))
    );
    if opposing_trend {
        if let Some(trend) = snapshot.price_trend {
            indicators.push(format!("price trend {trend} against {}", position.side));
        }
    }

    match indicators.len() {
        0 => ExitSignal::hold(),
        1 => ExitSignal::warning(
            ExitReason::TechnicalBreakdown,
            3,
            0.5,
            format!("single breakdown indicator: {}", indicators[0]),
        ),
        n => ExitSignal::exit(
            ExitReason::TechnicalBreakdown,
            4,
            0.9,
            snapshot.current_price,
            format!("{n} breakdown indicators: {}", indicators.join("; ")),
        ),
    }
}

// =============================================================================
// Risk Management — low-confidence drift
// =============================================================================

fn check_risk_management(
    position: &Position,
    snapshot: &MarketSnapshot,
    config: &EngineConfig,
) -> ExitSignal {
    if position.confidence >= LOW_CONFIDENCE_CEILING {
        return ExitSignal::hold();
    }

    let drift_pct = signed_return_pct(position, snapshot.current_price);
    if drift_pct.abs() >= DRIFT_BAND_PCT {
        return ExitSignal::hold();
    }

    let liquidity = config.instrument(&position.symbol).liquidity;
    let patience_secs = config.patience_window_secs(liquidity);
    let held_secs = snapshot.hold_duration(position.entry_time).num_seconds() as u64;

    if held_secs >= patience_secs {
        return ExitSignal::exit(
            ExitReason::RiskManagement,
            2,
            0.70,
            snapshot.current_price,
            format!(
                "low-confidence position ({:.2}) drifting at {drift_pct:+.2}% after {}m ({liquidity} liquidity)",
                position.confidence,
                held_secs / 60
            ),
        );
    }

    ExitSignal::hold()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketContext;
    use chrono::{Duration, Utc};

    fn position(side: PositionSide, confidence: f64, context: MarketContext) -> Position {
        let mut pos = Position::open(
            "ZZZZ",
            side,
            100.0,
            10,
            confidence,
            context,
            "pred-1",
            Utc::now() - Duration::hours(1),
        )
        .unwrap();
        pos.current_price = 100.0;
        pos
    }

    fn snapshot(price: f64) -> MarketSnapshot {
        MarketSnapshot::price_only(price, Utc::now())
    }

    // ── Stop loss ───────────────────────────────────────────────────────

    #[test]
    fn stop_loss_fires_at_boundary() {
        // Threshold for confidence 0.5 / neutral / unknown symbol is 2.0%.
        let cfg = EngineConfig::default();
        let pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);

        let signal = ExitCondition::StopLoss.evaluate(&pos, &snapshot(97.4), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::StopLoss);
        assert_eq!(signal.urgency, 5);
        assert!(signal.confidence >= 0.95);
        assert_eq!(signal.recommended_exit_price, Some(97.4));
    }

    #[test]
    fn stop_loss_warns_inside_the_80_pct_band() {
        let cfg = EngineConfig::default();
        let pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);

        // 1.7% loss against a 2.0% threshold: beyond 80% but not breached.
        let signal = ExitCondition::StopLoss.evaluate(&pos, &snapshot(98.3), &cfg);
        assert!(!signal.should_exit);
        assert_eq!(signal.reason, ExitReason::StopLoss);
        assert_eq!(signal.urgency, 3);
    }

    #[test]
    fn stop_loss_holds_when_in_profit() {
        let cfg = EngineConfig::default();
        let pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        let signal = ExitCondition::StopLoss.evaluate(&pos, &snapshot(103.0), &cfg);
        assert_eq!(signal, ExitSignal::hold());
    }

    #[test]
    fn stop_loss_is_directional_for_shorts() {
        let cfg = EngineConfig::default();
        let pos = position(PositionSide::Short, 0.5, MarketContext::Neutral);
        // Price rose 2.6% — a 2.6% loss on a short.
        let signal = ExitCondition::StopLoss.evaluate(&pos, &snapshot(102.6), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::StopLoss);
    }

    // ── Profit target ───────────────────────────────────────────────────

    #[test]
    fn profit_target_warns_below_target() {
        // Target: 3.0 * 1.5 * 1.0 * 1.2 = 5.4%; 4.5% is past the 80% band.
        let cfg = EngineConfig::default();
        let mut pos = position(PositionSide::Long, 0.85, MarketContext::Bullish);
        pos.symbol = "AAPL".to_string();

        let signal = ExitCondition::ProfitTarget.evaluate(&pos, &snapshot(104.5), &cfg);
        assert!(!signal.should_exit, "4.5% gain is below the 5.4% target");
        assert_eq!(signal.reason, ExitReason::ProfitTarget);
        assert_eq!(signal.urgency, 2);
    }

    #[test]
    fn profit_target_exits_at_target() {
        let cfg = EngineConfig::default();
        let mut pos = position(PositionSide::Long, 0.85, MarketContext::Bullish);
        pos.symbol = "AAPL".to_string();

        let signal = ExitCondition::ProfitTarget.evaluate(&pos, &snapshot(105.5), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.urgency, 4);
    }

    #[test]
    fn runaway_gain_raises_urgency() {
        let cfg = EngineConfig::default();
        let pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        // Target 2.4%; 4.0% is past 1.5x.
        let signal = ExitCondition::ProfitTarget.evaluate(&pos, &snapshot(104.0), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.urgency, 5);
    }

    // ── Time limit ──────────────────────────────────────────────────────

    #[test]
    fn time_limit_fires_after_max_hold() {
        let cfg = EngineConfig::default();
        let mut pos = position(PositionSide::Long, 0.9, MarketContext::Neutral);
        pos.entry_time = Utc::now() - Duration::hours(25);

        let signal = ExitCondition::TimeLimit.evaluate(&pos, &snapshot(100.5), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::TimeLimit);
        // Confidence scales with position confidence: 0.9 * 0.8 = 0.72.
        assert!((signal.confidence - 0.72).abs() < 1e-9);
    }

    #[test]
    fn time_limit_confidence_has_a_floor() {
        let cfg = EngineConfig::default();
        let mut pos = position(PositionSide::Long, 0.2, MarketContext::Neutral);
        pos.entry_time = Utc::now() - Duration::hours(25);

        let signal = ExitCondition::TimeLimit.evaluate(&pos, &snapshot(100.5), &cfg);
        assert!(signal.should_exit);
        assert!((signal.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn time_limit_warns_near_max_hold() {
        let cfg = EngineConfig::default();
        let mut pos = position(PositionSide::Long, 0.9, MarketContext::Neutral);
        pos.entry_time = Utc::now() - Duration::hours(20);

        let signal = ExitCondition::TimeLimit.evaluate(&pos, &snapshot(100.5), &cfg);
        assert!(!signal.should_exit);
        assert_eq!(signal.urgency, 2);
    }

    // ── Sentiment reversal ──────────────────────────────────────────────

    #[test]
    fn sentiment_reversal_inert_without_entry_sentiment() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.current_sentiment = Some(-0.9);
        // entry_sentiment stays None.

        let signal = check_sentiment_reversal(&pos, &snap);
        assert!(!signal.should_exit);
        assert_eq!(signal.reason, ExitReason::NoExit);
        assert_eq!(signal.urgency, 1);
    }

    #[test]
    fn sentiment_reversal_fires_on_long_when_delta_drops() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.entry_sentiment = Some(0.5);
        snap.current_sentiment = Some(0.05);

        let signal = check_sentiment_reversal(&pos, &snap);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::SentimentReversal);
        assert_eq!(signal.urgency, 3);
    }

    #[test]
    fn sentiment_reversal_is_directional() {
        // The same negative shift helps a short, so no exit.
        let pos = position(PositionSide::Short, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.entry_sentiment = Some(0.5);
        snap.current_sentiment = Some(0.05);

        let signal = check_sentiment_reversal(&pos, &snap);
        assert!(!signal.should_exit);

        // A positive shift of the same size exits the short.
        snap.entry_sentiment = Some(-0.3);
        snap.current_sentiment = Some(0.2);
        let signal = check_sentiment_reversal(&pos, &snap);
        assert!(signal.should_exit);
    }

    #[test]
    fn full_swing_reversal_escalates_urgency() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.entry_sentiment = Some(0.6);
        snap.current_sentiment = Some(-0.4);

        let signal = check_sentiment_reversal(&pos, &snap);
        assert!(signal.should_exit);
        assert_eq!(signal.urgency, 4);
    }

    // ── Technical breakdown ─────────────────────────────────────────────

    #[test]
    fn technical_breakdown_inert_with_no_indicators() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let signal = check_technical_breakdown(&pos, &snapshot(100.0));
        assert!(!signal.should_exit);
        assert_eq!(signal.reason, ExitReason::NoExit);
    }

    #[test]
    fn single_extreme_rsi_is_only_a_warning() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.rsi = Some(83.0);
        snap.macd_signal = Some(MacdSignal::Neutral);
        snap.price_trend = Some(PriceTrend::Sideways);

        let signal = check_technical_breakdown(&pos, &snap);
        assert!(!signal.should_exit, "one indicator is never enough to exit");
        assert_eq!(signal.reason, ExitReason::TechnicalBreakdown);
        assert_eq!(signal.urgency, 3);
    }

    #[test]
    fn corroborated_breakdown_exits() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.rsi = Some(83.0);
        snap.macd_signal = Some(MacdSignal::Neutral);
        snap.price_trend = Some(PriceTrend::StronglyBearish);

        let signal = check_technical_breakdown(&pos, &snap);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::TechnicalBreakdown);
        assert_eq!(signal.urgency, 4);
        assert!((signal.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn elevated_rsi_needs_opposing_macd() {
        let pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);

        // RSI 74 with neutral MACD: no indicator at all.
        let mut snap = snapshot(100.0);
        snap.rsi = Some(74.0);
        snap.macd_signal = Some(MacdSignal::Neutral);
        let signal = check_technical_breakdown(&pos, &snap);
        assert_eq!(signal, ExitSignal::hold());

        // RSI 74 with bearish MACD: the pair corroborates — exit.
        snap.macd_signal = Some(MacdSignal::Bearish);
        let signal = check_technical_breakdown(&pos, &snap);
        assert!(signal.should_exit);
    }

    #[test]
    fn breakdown_mirrors_for_shorts() {
        let pos = position(PositionSide::Short, 0.8, MarketContext::Neutral);
        let mut snap = snapshot(100.0);
        snap.rsi = Some(15.0);
        snap.price_trend = Some(PriceTrend::StronglyBullish);

        let signal = check_technical_breakdown(&pos, &snap);
        assert!(signal.should_exit);
    }

    // ── Risk management ─────────────────────────────────────────────────

    #[test]
    fn drift_rule_needs_all_three_conditions() {
        let cfg = EngineConfig::default();
        let now = Utc::now();

        // Low confidence, flat, held past the standard 2h patience window.
        let mut pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        pos.entry_time = now - Duration::hours(3);
        let signal = ExitCondition::RiskManagement.evaluate(&pos, &snapshot(100.3), &cfg);
        assert!(signal.should_exit);
        assert_eq!(signal.reason, ExitReason::RiskManagement);
        assert_eq!(signal.urgency, 2);
        assert!((signal.confidence - 0.70).abs() < 1e-9);

        // Confident prediction: hold.
        let mut pos = position(PositionSide::Long, 0.8, MarketContext::Neutral);
        pos.entry_time = now - Duration::hours(3);
        let signal = ExitCondition::RiskManagement.evaluate(&pos, &snapshot(100.3), &cfg);
        assert!(!signal.should_exit);

        // Moving position: hold.
        let mut pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        pos.entry_time = now - Duration::hours(3);
        let signal = ExitCondition::RiskManagement.evaluate(&pos, &snapshot(101.5), &cfg);
        assert!(!signal.should_exit);

        // Too early: hold.
        let mut pos = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        pos.entry_time = now - Duration::minutes(30);
        let signal = ExitCondition::RiskManagement.evaluate(&pos, &snapshot(100.3), &cfg);
        assert!(!signal.should_exit);
    }

    #[test]
    fn high_liquidity_names_get_longer_patience() {
        let cfg = EngineConfig::default();
        let now = Utc::now();

        // 3h hold: past the 2h standard window, inside the 4h high-liquidity
        // window.
        let mut thin = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        thin.entry_time = now - Duration::hours(3);
        let signal = ExitCondition::RiskManagement.evaluate(&thin, &snapshot(100.3), &cfg);
        assert!(signal.should_exit);

        let mut major = position(PositionSide::Long, 0.5, MarketContext::Neutral);
        major.symbol = "AAPL".to_string();
        major.entry_time = now - Duration::hours(3);
        let signal = ExitCondition::RiskManagement.evaluate(&major, &snapshot(100.3), &cfg);
        assert!(!signal.should_exit);
    }

    // ── Priorities ──────────────────────────────────────────────────────

    #[test]
    fn priorities_match_the_arbitration_table() {
        assert_eq!(ExitCondition::StopLoss.priority(), 5);
        assert_eq!(ExitCondition::TechnicalBreakdown.priority(), 4);
        assert_eq!(ExitCondition::ProfitTarget.priority(), 3);
        assert_eq!(ExitCondition::SentimentReversal.priority(), 3);
        assert_eq!(ExitCondition::RiskManagement.priority(), 2);
        assert_eq!(ExitCondition::TimeLimit.priority(), 2);
    }
}

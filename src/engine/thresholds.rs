// =============================================================================
// Threshold Calculators — confidence / instrument / regime scaled percentages
// =============================================================================
//
// Pure functions mapping (confidence, instrument identity, market context) to
// the percentage thresholds the profit-target and stop-loss conditions check
// against.  Total and deterministic: unknown symbols fall back to neutral
// multipliers, and no input can make them fail.

use crate::config::EngineConfig;
use crate::ledger::Position;
use crate::types::MarketContext;

/// Signed return of the position in percent: positive when the trade is in
/// profit, regardless of direction.
pub fn signed_return_pct(position: &Position, current_price: f64) -> f64 {
    let raw = (current_price - position.entry_price) / position.entry_price * 100.0;
    position.side.direction() * raw
}

/// Profit target for this position as a percentage of entry price.
///
/// `base * confidence_tier * instrument * market`.  Higher confidence and a
/// bullish regime stretch the target; lower-liquidity instruments shrink it.
pub fn profit_target_pct(
    config: &EngineConfig,
    position: &Position,
    context: MarketContext,
) -> f64 {
    let (profit_tier, _) = config.tier_for(position.confidence);
    let instrument = config.instrument(&position.symbol);
    let market = config.market_multipliers.for_context(context);

    config.base_profit_target_pct * profit_tier * instrument.profit_multiplier * market
}

/// Stop-loss distance for this position as a percentage of entry price.
///
/// Same structure as the profit target but over the stop tables: lower
/// confidence tightens the stop, and lower-liquidity instruments carry their
/// own tighter multiplier.
pub fn stop_loss_pct(config: &EngineConfig, position: &Position, context: MarketContext) -> f64 {
    let (_, stop_tier) = config.tier_for(position.confidence);
    let instrument = config.instrument(&position.symbol);
    let market = config.market_multipliers.for_context(context);

    config.base_stop_loss_pct * stop_tier * instrument.stop_multiplier * market
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionSide;
    use chrono::Utc;

    fn position(symbol: &str, side: PositionSide, confidence: f64) -> Position {
        Position::open(
            symbol,
            side,
            100.0,
            10,
            confidence,
            MarketContext::Neutral,
            "pred-1",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn signed_return_is_directional() {
        let long = position("AAPL", PositionSide::Long, 0.7);
        assert!((signed_return_pct(&long, 104.0) - 4.0).abs() < 1e-9);
        assert!((signed_return_pct(&long, 97.0) - (-3.0)).abs() < 1e-9);

        let short = position("AAPL", PositionSide::Short, 0.7);
        assert!((signed_return_pct(&short, 97.0) - 3.0).abs() < 1e-9);
        assert!((signed_return_pct(&short, 104.0) - (-4.0)).abs() < 1e-9);
    }

    #[test]
    fn profit_target_scales_with_all_three_multipliers() {
        let cfg = EngineConfig::default();

        // High confidence on a neutral major in a bullish regime:
        // 3.0 * 1.5 * 1.0 * 1.2 = 5.4
        let pos = position("AAPL", PositionSide::Long, 0.85);
        let target = profit_target_pct(&cfg, &pos, MarketContext::Bullish);
        assert!((target - 5.4).abs() < 1e-9);

        // Low confidence, unknown symbol, neutral regime: 3.0 * 0.8 = 2.4
        let pos = position("ZZZZ", PositionSide::Long, 0.5);
        let target = profit_target_pct(&cfg, &pos, MarketContext::Neutral);
        assert!((target - 2.4).abs() < 1e-9);
    }

    #[test]
    fn stop_loss_matches_boundary_example() {
        let cfg = EngineConfig::default();

        // confidence 0.5 in a neutral market on an unknown symbol:
        // 2.5 * 0.8 * 1.0 * 1.0 = 2.0
        let pos = position("ZZZZ", PositionSide::Long, 0.5);
        let stop = stop_loss_pct(&cfg, &pos, MarketContext::Neutral);
        assert!((stop - 2.0).abs() < 1e-9);
    }

    #[test]
    fn thresholds_are_monotone_in_confidence_tier() {
        let cfg = EngineConfig::default();
        let confidences = [0.3, 0.65, 0.75, 0.9];

        let mut last_target = 0.0;
        let mut last_stop = 0.0;
        for c in confidences {
            let pos = position("ZZZZ", PositionSide::Long, c);
            let target = profit_target_pct(&cfg, &pos, MarketContext::Neutral);
            let stop = stop_loss_pct(&cfg, &pos, MarketContext::Neutral);
            assert!(
                target >= last_target,
                "profit target must not shrink as confidence rises"
            );
            assert!(
                stop >= last_stop,
                "stop distance must not shrink as confidence rises"
            );
            last_target = target;
            last_stop = stop;
        }
    }

    #[test]
    fn bearish_regime_tightens_both_thresholds() {
        let cfg = EngineConfig::default();
        let pos = position("AAPL", PositionSide::Long, 0.75);

        let neutral_target = profit_target_pct(&cfg, &pos, MarketContext::Neutral);
        let bearish_target = profit_target_pct(&cfg, &pos, MarketContext::Bearish);
        assert!(bearish_target < neutral_target);

        let neutral_stop = stop_loss_pct(&cfg, &pos, MarketContext::Neutral);
        let bearish_stop = stop_loss_pct(&cfg, &pos, MarketContext::Bearish);
        assert!(bearish_stop < neutral_stop);
    }

    #[test]
    fn lower_liquidity_instrument_tightens_stop() {
        let cfg = EngineConfig::default();
        let major = position("AAPL", PositionSide::Long, 0.75);
        let thin = position("PLTR", PositionSide::Long, 0.75);

        let major_stop = stop_loss_pct(&cfg, &major, MarketContext::Neutral);
        let thin_stop = stop_loss_pct(&cfg, &thin, MarketContext::Neutral);
        assert!(thin_stop < major_stop);
    }
}

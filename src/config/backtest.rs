//! Backtest run constants (Immutable Blueprints)

use crate::config::PositionFraction;

pub struct BacktestConfig {
    /// Fewer candles than this and we refuse to run.
    pub min_viable_candles: usize,
    /// Candles requested when the caller does not say.
    pub default_limit: usize,
    pub default_capital: f64,
    /// Share of current capital committed on each entry.
    pub position_fraction: PositionFraction,
    /// Reported instead of an infinite profit factor when nothing lost.
    pub profit_factor_cap: f64,
    pub default_symbol: &'static str,
    pub default_interval: &'static str,
}

pub const BACKTEST: BacktestConfig = BacktestConfig {
    min_viable_candles: 60,
    default_limit: 500,
    default_capital: 10_000.0,
    position_fraction: PositionFraction::new(0.10),
    profit_factor_cap: 999.99,
    default_symbol: "BTCUSDT",
    default_interval: "1h",
};

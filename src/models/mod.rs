mod equity;
mod result;
mod signal;
mod strategy_kind;
mod trade;

pub use {
    equity::EquityPoint,
    result::{BacktestResult, BacktestStats},
    signal::StrategySignal,
    strategy_kind::StrategyKind,
    trade::{ExitReason, Trade, TradeDirection},
};

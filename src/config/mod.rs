//! Configuration module for the backtester.

// Can all be private because we have a public re-export.
mod backtest;
mod binance;
mod persistence;
mod strategy;
mod types;

// Re-export commonly used items
pub use backtest::{BACKTEST, BacktestConfig};
pub use binance::{BINANCE, BINANCE_QUOTE_ASSETS, BinanceApiConfig};
pub use persistence::{PERSISTENCE, kline_dump_filename, result_filename};
pub use strategy::{
    BollingerParams, BreakoutParams, MaCrossoverParams, RsiReversionParams, STRATEGY,
    StrategyParams,
};
pub use types::PositionFraction;

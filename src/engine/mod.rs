mod backtest;
mod simulator;
mod stats;

pub use {
    backtest::{BacktestRequest, compare_strategies, fetch_and_run, run_backtest},
    simulator::{SimulationOutput, TradeSimulator},
    stats::{compute_stats, max_drawdown_pct, profit_factor, sharpe_ratio},
};

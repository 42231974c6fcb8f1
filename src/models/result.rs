use {
    crate::{
        domain::PairInterval,
        models::{EquityPoint, StrategyKind, Trade},
    },
    serde::{Deserialize, Serialize},
};

/// Summary statistics for one completed backtest. Every field is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BacktestStats {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub win_rate_pct: f64,
    /// Largest peak-to-trough fall of the strategy equity, as a positive percent.
    pub max_drawdown_pct: f64,
    /// Mean over standard deviation of per-candle returns, risk-free rate 0.
    pub sharpe_ratio: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Gross profit over gross loss, capped when nothing lost.
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Positive magnitude.
    pub avg_loss: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
}

/// Everything one run produces. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub pair_interval: PairInterval,
    pub strategy: StrategyKind,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub stats: BacktestStats,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.stats.final_equity
    }
}

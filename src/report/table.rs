use {
    crate::{
        error::Result,
        models::{BacktestResult, BacktestStats, StrategyKind, Trade},
        utils::{epoch_ms_to_utc, format_duration},
    },
    tabled::{Table, Tabled, settings::Style},
};

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct TradeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Entry")]
    entry_time: String,
    #[tabled(rename = "Entry Px")]
    entry_price: String,
    #[tabled(rename = "Exit")]
    exit_time: String,
    #[tabled(rename = "Exit Px")]
    exit_price: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "P&L")]
    pnl: String,
    #[tabled(rename = "P&L %")]
    pnl_pct: String,
    #[tabled(rename = "Held")]
    held: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Return %")]
    total_return: String,
    #[tabled(rename = "Buy&Hold %")]
    buy_hold: String,
    #[tabled(rename = "Trades")]
    trades: String,
    #[tabled(rename = "Win %")]
    win_rate: String,
    #[tabled(rename = "Max DD %")]
    drawdown: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
    #[tabled(rename = "PF")]
    profit_factor: String,
}

fn stat_rows(stats: &BacktestStats) -> Vec<StatRow> {
    let row = |metric, value: String| StatRow { metric, value };
    vec![
        row("Initial capital", format!("{:.2}", stats.initial_capital)),
        row("Final equity", format!("{:.2}", stats.final_equity)),
        row("Total return", format!("{:+.2}%", stats.total_return_pct)),
        row("Buy & hold return", format!("{:+.2}%", stats.buy_hold_return_pct)),
        row("Trades", stats.total_trades.to_string()),
        row(
            "Won / lost",
            format!("{} / {}", stats.winning_trades, stats.losing_trades),
        ),
        row("Win rate", format!("{:.1}%", stats.win_rate_pct)),
        row("Max drawdown", format!("{:.2}%", stats.max_drawdown_pct)),
        row("Sharpe (per candle)", format!("{:.3}", stats.sharpe_ratio)),
        row("Profit factor", format!("{:.2}", stats.profit_factor)),
        row("Avg win", format!("{:.2}", stats.avg_win)),
        row("Avg loss", format!("{:.2}", stats.avg_loss)),
        row("Best trade", format!("{:+.2}%", stats.best_trade_pct)),
        row("Worst trade", format!("{:+.2}%", stats.worst_trade_pct)),
    ]
}

/// Summary table for one run, headed by pair and strategy.
pub fn stats_table(result: &BacktestResult) -> String {
    let mut table = Table::new(stat_rows(&result.stats));
    table.with(Style::rounded());
    format!(
        "{} | {} ({})\n{}",
        result.pair_interval,
        result.strategy,
        result.strategy.description(),
        table
    )
}

/// Trade ledger. An empty ledger renders as a single line rather than a bare header.
pub fn trades_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades.".to_string();
    }
    let rows: Vec<TradeRow> = trades
        .iter()
        .enumerate()
        .map(|(i, t)| TradeRow {
            index: i + 1,
            entry_time: epoch_ms_to_utc(t.entry_time_ms),
            entry_price: format!("{:.4}", t.entry_price),
            exit_time: epoch_ms_to_utc(t.exit_time_ms),
            exit_price: format!("{:.4}", t.exit_price),
            quantity: format!("{:.6}", t.quantity),
            pnl: format!("{:+.2}", t.pnl),
            pnl_pct: format!("{:+.2}%", t.pnl_pct),
            held: format_duration(t.holding_ms()),
            reason: t.exit_reason.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// One line per strategy. Failed runs keep their row with the error in place of numbers.
pub fn comparison_table(results: &[(StrategyKind, Result<BacktestResult>)]) -> String {
    let rows: Vec<ComparisonRow> = results
        .iter()
        .map(|(kind, outcome)| match outcome {
            Ok(r) => {
                let s = &r.stats;
                ComparisonRow {
                    strategy: kind.to_string(),
                    total_return: format!("{:+.2}", s.total_return_pct),
                    buy_hold: format!("{:+.2}", s.buy_hold_return_pct),
                    trades: s.total_trades.to_string(),
                    win_rate: format!("{:.1}", s.win_rate_pct),
                    drawdown: format!("{:.2}", s.max_drawdown_pct),
                    sharpe: format!("{:.3}", s.sharpe_ratio),
                    profit_factor: format!("{:.2}", s.profit_factor),
                }
            }
            Err(e) => ComparisonRow {
                strategy: kind.to_string(),
                total_return: format!("error: {}", e),
                buy_hold: "-".into(),
                trades: "-".into(),
                win_rate: "-".into(),
                drawdown: "-".into(),
                sharpe: "-".into(),
                profit_factor: "-".into(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

use {
    crate::{
        config::BACKTEST,
        models::{BacktestStats, EquityPoint, Trade},
        utils::{finite_or, pct_change, period_returns},
    },
    statrs::statistics::Statistics,
};

/// Aggregate performance for a finished run.
///
/// Total return is read from the last equity point; without a curve it falls
/// back to capital plus realised P&L. Nothing returned is NaN or infinite.
pub fn compute_stats(
    initial_capital: f64,
    trades: &[Trade],
    equity_curve: &[EquityPoint],
) -> BacktestStats {
    let realised: f64 = trades.iter().map(|t| t.pnl).sum();
    let final_equity = equity_curve
        .last()
        .map(|p| p.strategy_equity)
        .unwrap_or(initial_capital + realised);
    let buy_hold_final = equity_curve
        .last()
        .map(|p| p.buy_hold_equity)
        .unwrap_or(initial_capital);

    let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
    let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl).collect();
    let gross_win: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();

    let win_rate_pct = if trades.is_empty() {
        0.0
    } else {
        wins.len() as f64 / trades.len() as f64 * 100.0
    };

    let equity: Vec<f64> = equity_curve.iter().map(|p| p.strategy_equity).collect();

    let best_trade_pct = trades
        .iter()
        .map(|t| t.pnl_pct)
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.max(x))))
        .unwrap_or(0.0);
    let worst_trade_pct = trades
        .iter()
        .map(|t| t.pnl_pct)
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.min(x))))
        .unwrap_or(0.0);

    BacktestStats {
        initial_capital,
        final_equity,
        total_return_pct: finite_or(pct_change(initial_capital, final_equity), 0.0),
        buy_hold_return_pct: finite_or(pct_change(initial_capital, buy_hold_final), 0.0),
        win_rate_pct,
        max_drawdown_pct: max_drawdown_pct(&equity),
        sharpe_ratio: sharpe_ratio(&equity),
        total_trades: trades.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        profit_factor: profit_factor(gross_win, gross_loss, trades.len()),
        avg_win: average(gross_win, wins.len()),
        avg_loss: average(gross_loss, losses.len()),
        best_trade_pct,
        worst_trade_pct,
    }
}

/// Largest peak-to-trough fall, as a positive percentage of the peak.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        if peak > f64::EPSILON {
            worst = worst.max((peak - value) / peak * 100.0);
        }
    }
    finite_or(worst, 0.0)
}

/// Mean over sample standard deviation of per-period returns (risk-free 0, not annualised).
pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns = period_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().mean();
    let std_dev = returns.iter().std_dev();
    if !std_dev.is_finite() || std_dev <= f64::EPSILON {
        return 0.0;
    }
    finite_or(mean / std_dev, 0.0)
}

/// Gross profit over gross loss.
///
/// No trades gives 0. Winners with no losers give [`BACKTEST.profit_factor_cap`].
pub fn profit_factor(gross_win: f64, gross_loss: f64, trade_count: usize) -> f64 {
    if trade_count == 0 {
        return 0.0;
    }
    if gross_loss <= f64::EPSILON {
        return if gross_win > 0.0 {
            BACKTEST.profit_factor_cap
        } else {
            0.0
        };
    }
    finite_or(gross_win / gross_loss, 0.0).min(BACKTEST.profit_factor_cap)
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExitReason, TradeDirection};
    use approx::assert_relative_eq;

    fn trade(entry_ms: i64, pnl: f64) -> Trade {
        Trade {
            direction: TradeDirection::Long,
            entry_time_ms: entry_ms,
            entry_price: 100.0,
            exit_time_ms: entry_ms + 1,
            exit_price: 100.0 + pnl / 10.0,
            quantity: 10.0,
            pnl,
            pnl_pct: pnl / 10.0,
            exit_reason: ExitReason::Signal,
        }
    }

    fn point(ts: i64, equity: f64) -> EquityPoint {
        EquityPoint {
            timestamp_ms: ts,
            strategy_equity: equity,
            buy_hold_equity: 10_000.0,
        }
    }

    #[test]
    fn one_winner_one_loser() {
        let trades = [trade(0, 500.0), trade(10, -200.0)];
        let curve = [point(0, 10_000.0), point(5, 10_500.0), point(15, 10_300.0)];
        let stats = compute_stats(10_000.0, &trades, &curve);

        assert_relative_eq!(stats.total_return_pct, 3.0, epsilon = 1e-9);
        assert_relative_eq!(stats.win_rate_pct, 50.0);
        assert_relative_eq!(stats.profit_factor, 2.5);
        assert_relative_eq!(stats.avg_win, 500.0);
        assert_relative_eq!(stats.avg_loss, 200.0);
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 1);
        assert_relative_eq!(stats.best_trade_pct, 50.0);
        assert_relative_eq!(stats.worst_trade_pct, -20.0);
    }

    #[test]
    fn no_trades_is_all_zero_and_finite() {
        let curve = [point(0, 10_000.0), point(1, 10_000.0), point(2, 10_000.0)];
        let stats = compute_stats(10_000.0, &[], &curve);

        assert_eq!(stats.win_rate_pct, 0.0);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.avg_win, 0.0);
        assert_eq!(stats.avg_loss, 0.0);
        assert_eq!(stats.sharpe_ratio, 0.0);
        assert_eq!(stats.max_drawdown_pct, 0.0);
        assert_eq!(stats.total_return_pct, 0.0);
    }

    #[test]
    fn only_winners_uses_cap() {
        let stats = compute_stats(1_000.0, &[trade(0, 50.0)], &[]);
        assert_eq!(stats.profit_factor, BACKTEST.profit_factor_cap);
        assert_relative_eq!(stats.final_equity, 1_050.0);
        assert_relative_eq!(stats.total_return_pct, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = max_drawdown_pct(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert_relative_eq!(dd, 25.0, epsilon = 1e-9);
        assert_eq!(max_drawdown_pct(&[]), 0.0);
    }

    #[test]
    fn sharpe_sign_follows_returns() {
        assert!(sharpe_ratio(&[100.0, 101.0, 103.0, 104.0]) > 0.0);
        assert!(sharpe_ratio(&[100.0, 99.0, 97.0, 96.0]) < 0.0);
        // Constant returns have no dispersion.
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0]), 0.0);
    }
}

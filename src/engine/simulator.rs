//! Long-only trade simulator.
//!
//! One pass over the candles. The position is `Flat` or `Long`; entries size
//! the position from capital at that moment, and capital only moves when a
//! trade is closed.

use crate::{
    config::PositionFraction,
    domain::Candle,
    models::{EquityPoint, ExitReason, StrategySignal, Trade, TradeDirection},
    utils::{finite_or, pct_change},
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Position {
    Flat,
    Long {
        entry_idx: usize,
        entry_price: f64,
        quantity: f64,
    },
}

/// What the simulator hands back before statistics are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_capital: f64,
}

pub struct TradeSimulator {
    initial_capital: f64,
    position_fraction: PositionFraction,
}

impl TradeSimulator {
    pub fn new(initial_capital: f64, position_fraction: PositionFraction) -> Self {
        Self {
            initial_capital,
            position_fraction,
        }
    }

    /// Walk `candles` applying `signals[i]` at the close of candle `i`.
    ///
    /// `signals` must be the same length as `candles`.
    pub fn run(&self, candles: &[Candle], signals: &[StrategySignal]) -> SimulationOutput {
        debug_assert_eq!(candles.len(), signals.len());

        let mut capital = self.initial_capital;
        let mut position = Position::Flat;
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(candles.len());

        let Some(first) = candles.first() else {
            return SimulationOutput {
                trades,
                equity_curve,
                final_capital: capital,
            };
        };
        let first_close = first.close_price;
        let last_idx = candles.len() - 1;

        for (i, (candle, signal)) in candles.iter().zip(signals).enumerate() {
            let close = candle.close_price;

            position = match (position, signal) {
                // Entering on the final candle would close on the same timestamp.
                (Position::Flat, StrategySignal::EnterLong)
                    if i < last_idx && close.is_finite() && close > 0.0 =>
                {
                    let quantity = capital * self.position_fraction.value() / close;
                    log::debug!(
                        "ENTER_LONG @ {:.4} qty {:.6} (capital {:.2})",
                        close,
                        quantity,
                        capital
                    );
                    Position::Long {
                        entry_idx: i,
                        entry_price: close,
                        quantity,
                    }
                }
                (
                    Position::Long {
                        entry_idx,
                        entry_price,
                        quantity,
                    },
                    StrategySignal::ExitLong,
                ) => {
                    let trade = close_trade(
                        candles,
                        entry_idx,
                        entry_price,
                        quantity,
                        i,
                        ExitReason::Signal,
                    );
                    capital += trade.pnl;
                    trades.push(trade);
                    Position::Flat
                }
                (unchanged, _) => unchanged,
            };

            if i == last_idx {
                if let Position::Long {
                    entry_idx,
                    entry_price,
                    quantity,
                } = position
                {
                    let trade = close_trade(
                        candles,
                        entry_idx,
                        entry_price,
                        quantity,
                        i,
                        ExitReason::EndOfData,
                    );
                    capital += trade.pnl;
                    trades.push(trade);
                    position = Position::Flat;
                }
            }

            let strategy_equity = match position {
                Position::Flat => capital,
                Position::Long {
                    entry_price,
                    quantity,
                    ..
                } => capital + quantity * (close - entry_price),
            };
            equity_curve.push(EquityPoint {
                timestamp_ms: candle.timestamp_ms,
                strategy_equity,
                buy_hold_equity: self.buy_hold(first_close, close),
            });
        }

        SimulationOutput {
            trades,
            equity_curve,
            final_capital: capital,
        }
    }

    /// Initial capital scaled by the price ratio. Flat when the first close is unusable.
    fn buy_hold(&self, first_close: f64, close: f64) -> f64 {
        if first_close.is_finite() && first_close > 0.0 {
            finite_or(self.initial_capital * close / first_close, self.initial_capital)
        } else {
            self.initial_capital
        }
    }
}

fn close_trade(
    candles: &[Candle],
    entry_idx: usize,
    entry_price: f64,
    quantity: f64,
    exit_idx: usize,
    exit_reason: ExitReason,
) -> Trade {
    let exit_price = candles[exit_idx].close_price;
    let pnl = quantity * (exit_price - entry_price);
    log::debug!(
        "EXIT_LONG @ {:.4} ({}) pnl {:+.2}",
        exit_price,
        exit_reason,
        pnl
    );
    Trade {
        direction: TradeDirection::Long,
        entry_time_ms: candles[entry_idx].timestamp_ms,
        entry_price,
        exit_time_ms: candles[exit_idx].timestamp_ms,
        exit_price,
        quantity,
        pnl,
        pnl_pct: pct_change(entry_price, exit_price),
        exit_reason,
    }
}

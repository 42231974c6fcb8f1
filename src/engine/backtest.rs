//! Backtest orchestration.
//!
//! Entry points: [`run_backtest`] for candles already in hand, and
//! [`fetch_and_run`] for the full validate → fetch → check → run path.
//!
//! # Approach
//! 1. The request is validated before anything touches the network.
//! 2. The strategy rule classifies every candle (no lookahead).
//! 3. [`TradeSimulator`] replays those signals once, long-only.
//! 4. Statistics are computed from the trade list and equity curve.
//!
//! A run is synchronous and owns its inputs; nothing is shared between runs.

use {
    crate::{
        analysis::rule_for,
        config::{BACKTEST, BINANCE, PositionFraction, StrategyParams},
        data::{CandleSource, validate_series},
        domain::{Candle, PairInterval},
        engine::{TradeSimulator, compute_stats},
        error::{BacktestError, Result},
        models::{BacktestResult, StrategyKind},
        trace_time,
    },
    rayon::prelude::*,
    strum::IntoEnumIterator,
};

// ─── Public config ────────────────────────────────────────────────────────────

/// Everything needed to run one backtest.
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub pair_interval: PairInterval,
    pub strategy: StrategyKind,
    pub initial_capital: f64,
    /// How many candles to fetch.
    pub limit: usize,
    /// Fetch candles up to this open time (ms). `None` means "latest".
    pub end_time_ms: Option<i64>,
    pub position_fraction: PositionFraction,
    pub params: StrategyParams,
}

impl BacktestRequest {
    /// Request with default sizing, limit and indicator parameters.
    pub fn new(pair_interval: PairInterval, strategy: StrategyKind, initial_capital: f64) -> Self {
        Self {
            pair_interval,
            strategy,
            initial_capital,
            limit: BACKTEST.default_limit,
            end_time_ms: None,
            position_fraction: PositionFraction::default(),
            params: StrategyParams::default(),
        }
    }

    /// Reject malformed input before any fetch.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::validation(format!(
                "capital must be a positive number, got {}",
                self.initial_capital
            )));
        }

        let symbol = self.pair_interval.name();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BacktestError::validation(format!(
                "symbol '{}' must be non-empty and alphanumeric",
                symbol
            )));
        }

        if self.pair_interval.interval_str() == "unknown" {
            return Err(BacktestError::validation(format!(
                "unsupported interval {}ms",
                self.pair_interval.interval_ms
            )));
        }

        let max_limit = BINANCE.limits.klines_limit as usize;
        if self.limit < BACKTEST.min_viable_candles || self.limit > max_limit {
            return Err(BacktestError::validation(format!(
                "candle count must be between {} and {}, got {}",
                BACKTEST.min_viable_candles, max_limit, self.limit
            )));
        }

        if PositionFraction::try_new(self.position_fraction.value()).is_none() {
            return Err(BacktestError::validation(format!(
                "position fraction must be in (0, 1], got {}",
                self.position_fraction.value()
            )));
        }

        // Builds the rule purely to surface bad indicator parameters now.
        rule_for(self.strategy, &self.params)?;
        Ok(())
    }
}

// ─── Main entry points ────────────────────────────────────────────────────────

/// Run `request.strategy` over `candles`, which must already be validated.
pub fn run_backtest(request: &BacktestRequest, candles: &[Candle]) -> Result<BacktestResult> {
    if candles.is_empty() {
        return Err(BacktestError::data_unavailable(
            request.pair_interval.name(),
            "no candles to backtest",
        ));
    }

    let rule = rule_for(request.strategy, &request.params)?;
    let signals = rule.evaluate(candles)?;

    let simulator = TradeSimulator::new(request.initial_capital, request.position_fraction);
    let output = trace_time!("simulate", 50_000, { simulator.run(candles, &signals) });
    let stats = compute_stats(request.initial_capital, &output.trades, &output.equity_curve);

    log::info!(
        "[backtest] {} | strategy={} | candles={} | trades={} | return={:+.2}% | win rate={:.1}%",
        request.pair_interval,
        request.strategy,
        candles.len(),
        stats.total_trades,
        stats.total_return_pct,
        stats.win_rate_pct,
    );

    Ok(BacktestResult {
        pair_interval: request.pair_interval.clone(),
        strategy: request.strategy,
        trades: output.trades,
        equity_curve: output.equity_curve,
        stats,
    })
}

/// Validate the request, pull candles from `source`, check them, then run.
///
/// A single fetch per call. Failures are returned, never retried.
pub async fn fetch_and_run(
    source: &dyn CandleSource,
    request: &BacktestRequest,
) -> Result<BacktestResult> {
    request.validate()?;

    let raw = source
        .fetch_candles(&request.pair_interval, request.limit, request.end_time_ms)
        .await?;
    let candles = validate_series(&request.pair_interval, raw)?;

    run_backtest(request, &candles)
}

/// Run every strategy over the same candles, in parallel.
///
/// Results come back in [`StrategyKind`] declaration order. The strategy on
/// `request` is ignored.
pub fn compare_strategies(
    request: &BacktestRequest,
    candles: &[Candle],
) -> Vec<(StrategyKind, Result<BacktestResult>)> {
    let kinds: Vec<StrategyKind> = StrategyKind::iter().collect();
    kinds
        .into_par_iter()
        .map(|kind| {
            let req = BacktestRequest {
                strategy: kind,
                ..request.clone()
            };
            (kind, run_backtest(&req, candles))
        })
        .collect()
}

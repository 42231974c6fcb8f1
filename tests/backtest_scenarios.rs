use {
    approx::assert_relative_eq,
    async_trait::async_trait,
    kline_backtester::{
        BacktestError, BacktestRequest, Candle, CandleSource, PairInterval, StrategyKind,
        compare_strategies,
        data::{load_result, save_result},
        fetch_and_run,
        models::ExitReason,
        run_backtest,
        utils::TimeUtils,
    },
    std::sync::atomic::{AtomicUsize, Ordering},
};

const CAPITAL: f64 = 10_000.0;

fn series(closes: impl IntoIterator<Item = f64>) -> Vec<Candle> {
    closes
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            Candle::new(
                i as i64 * TimeUtils::MS_IN_H,
                c,
                c * 1.005,
                c * 0.995,
                c,
                100.0,
                100.0 * c,
            )
        })
        .collect()
}

fn request(strategy: StrategyKind) -> BacktestRequest {
    BacktestRequest::new(
        PairInterval::from_shorthand("BTCUSDT", "1h").unwrap(),
        strategy,
        CAPITAL,
    )
}

/// In-memory source that counts how often it is asked for data.
struct StubSource {
    candles: Vec<Candle>,
    calls: AtomicUsize,
}

impl StubSource {
    fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CandleSource for StubSource {
    async fn fetch_candles(
        &self,
        _pair_interval: &PairInterval,
        limit: usize,
        _end_time_ms: Option<i64>,
    ) -> kline_backtester::Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = self.candles.len().saturating_sub(limit);
        Ok(self.candles[start..].to_vec())
    }
}

/// Source whose transport always fails.
struct UnreachableSource {
    calls: AtomicUsize,
}

#[async_trait]
impl CandleSource for UnreachableSource {
    async fn fetch_candles(
        &self,
        pair_interval: &PairInterval,
        _limit: usize,
        _end_time_ms: Option<i64>,
    ) -> kline_backtester::Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BacktestError::Network(format!(
            "connection refused while fetching {}",
            pair_interval
        )))
    }
}

#[test]
fn steady_uptrend_enters_once_and_profits() {
    let candles = series((0..100).map(|i| 100.0 + i as f64));
    let result = run_backtest(&request(StrategyKind::MaCrossover), &candles).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].exit_reason, ExitReason::EndOfData);

    let last = result.equity_curve.last().unwrap();
    assert!(last.strategy_equity > CAPITAL);
    assert!(last.buy_hold_equity > CAPITAL);
    // Only part of the capital is committed, and only after warm-up.
    assert!(last.strategy_equity <= last.buy_hold_equity);
    assert_relative_eq!(last.buy_hold_equity, CAPITAL * 199.0 / 100.0, epsilon = 1e-6);
    assert!(result.stats.total_return_pct > 0.0);
    assert_eq!(result.stats.winning_trades, 1);
}

#[test]
fn steady_downtrend_never_trades() {
    let candles = series((0..100).map(|i| 200.0 - i as f64));
    let result = run_backtest(&request(StrategyKind::MaCrossover), &candles).unwrap();

    assert!(result.trades.is_empty());
    assert_relative_eq!(result.final_equity(), CAPITAL);
    assert_eq!(result.stats.total_return_pct, 0.0);
    assert!(result.stats.buy_hold_return_pct < 0.0);
    assert_eq!(result.stats.profit_factor, 0.0);
}

#[test]
fn compare_shares_candles_across_strategies() {
    let candles = series((0..150).map(|i| 100.0 + (i as f64 / 7.0).sin() * 15.0));
    let results = compare_strategies(&request(StrategyKind::MaCrossover), &candles);

    assert_eq!(results.len(), 4);
    let buy_hold: Vec<f64> = results
        .iter()
        .map(|(_, r)| r.as_ref().unwrap().stats.buy_hold_return_pct)
        .collect();
    assert!(buy_hold.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn fetch_and_run_happy_path() {
    let source = StubSource::new(series((0..300).map(|i| 100.0 + i as f64 * 0.5)));
    let mut req = request(StrategyKind::MaCrossover);
    req.limit = 120;

    let result = fetch_and_run(&source, &req).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.equity_curve.len(), 120);
    assert_eq!(result.strategy, StrategyKind::MaCrossover);
}

#[tokio::test]
async fn too_few_candles_is_data_unavailable() {
    let source = StubSource::new(series((0..59).map(|i| 100.0 + i as f64)));
    let err = fetch_and_run(&source, &request(StrategyKind::RsiReversion))
        .await
        .unwrap_err();
    assert!(matches!(err, BacktestError::DataUnavailable { .. }), "{err}");
}

#[tokio::test]
async fn invalid_request_never_reaches_the_source() {
    let source = StubSource::new(series((0..100).map(|i| 100.0 + i as f64)));

    let mut zero_capital = request(StrategyKind::Breakout);
    zero_capital.initial_capital = 0.0;
    let mut bad_symbol = request(StrategyKind::Breakout);
    bad_symbol.pair_interval.name = "BTC-USDT".to_string();
    let mut too_many = request(StrategyKind::Breakout);
    too_many.limit = 5_000;

    for req in [zero_capital, bad_symbol, too_many] {
        let err = fetch_and_run(&source, &req).await.unwrap_err();
        assert!(matches!(err, BacktestError::Validation(_)), "{err}");
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn saved_result_reloads_unchanged() {
    let candles = series((0..120).map(|i| 100.0 + (i as f64 / 4.0).cos() * 8.0));
    let result = run_backtest(&request(StrategyKind::BollingerReversion), &candles).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("BTCUSDT_1h_bollinger-reversion.json");
    save_result(&path, &result).unwrap();
    assert_eq!(load_result(&path).unwrap(), result);
}

#[tokio::test]
async fn transport_failure_surfaces_as_network_error_after_one_call() {
    let source = UnreachableSource {
        calls: AtomicUsize::new(0),
    };
    let err = fetch_and_run(&source, &request(StrategyKind::MaCrossover))
        .await
        .unwrap_err();

    match err {
        BacktestError::Network(msg) => assert!(msg.contains("connection refused")),
        other => panic!("expected a network error, got {other}"),
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

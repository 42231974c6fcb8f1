use {
    async_trait::async_trait,
    std::path::PathBuf,
};

use crate::{
    data::bn_kline::{KlineField, klines_to_candles, load_klines},
    domain::{Candle, PairInterval},
    error::{BacktestError, Result},
};

/// Abstract interface for fetching historical candles.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Up to `limit` consecutive candles, newest last, ending at or before `end_time_ms`.
    async fn fetch_candles(
        &self,
        pair_interval: &PairInterval,
        limit: usize,
        end_time_ms: Option<i64>,
    ) -> Result<Vec<Candle>>;
}

/// Live data from the Binance public klines endpoint.
#[derive(Default)]
pub struct BinanceProvider;

impl BinanceProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CandleSource for BinanceProvider {
    async fn fetch_candles(
        &self,
        pair_interval: &PairInterval,
        limit: usize,
        end_time_ms: Option<i64>,
    ) -> Result<Vec<Candle>> {
        let rows = load_klines(pair_interval, limit, end_time_ms).await?;
        klines_to_candles(rows, pair_interval)
    }
}

/// Replays a raw klines dump (as written by `dump_klines`) from disk.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CandleSource for JsonFileProvider {
    async fn fetch_candles(
        &self,
        pair_interval: &PairInterval,
        limit: usize,
        end_time_ms: Option<i64>,
    ) -> Result<Vec<Candle>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            BacktestError::data_unavailable(
                pair_interval.name(),
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        let rows: Vec<Vec<KlineField>> = serde_json::from_slice(&bytes).map_err(|e| {
            BacktestError::data_unavailable(
                pair_interval.name(),
                format!("{} is not a klines dump: {}", self.path.display(), e),
            )
        })?;

        let mut candles = klines_to_candles(rows, pair_interval)?;
        if let Some(end) = end_time_ms {
            candles.retain(|c| c.timestamp_ms <= end);
        }
        candles.sort_by_key(|c| c.timestamp_ms);
        let start = candles.len().saturating_sub(limit);
        Ok(candles.split_off(start))
    }
}

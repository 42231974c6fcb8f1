use {
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    serde::{Deserialize, Serialize},
    std::convert::TryFrom,
    thiserror::Error,
};

use crate::{
    config::BinanceApiConfig,
    domain::{Candle, PairInterval},
    error::{BacktestError, Result},
    utils::TimeUtils,
};

pub fn try_interval_from_ms(ms: i64) -> std::result::Result<KlinesIntervalEnum, String> {
    use TimeUtils as T;
    match ms {
        T::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        T::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        T::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        T::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        T::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        T::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        T::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        T::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        T::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        T::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        T::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        T::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        T::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        T::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        T::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        T::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

/// One cell of a kline row as the exchange encodes it: times are integers,
/// prices and volumes are decimal strings. Plain numbers are accepted too so
/// hand-edited dumps still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KlineField {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl KlineField {
    fn as_f64(&self) -> Option<f64> {
        match self {
            KlineField::Integer(i) => Some(*i as f64),
            KlineField::Number(n) => Some(*n),
            KlineField::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    fn as_timestamp(&self) -> Option<i64> {
        match self {
            KlineField::Integer(i) => Some(*i),
            KlineField::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }
}

impl From<KlinesItemInner> for KlineField {
    fn from(inner: KlinesItemInner) -> Self {
        match inner {
            KlinesItemInner::Integer(a) => KlineField::Integer(a),
            KlinesItemInner::String(s) => KlineField::Text(s),
            #[allow(unreachable_patterns)]
            _ => KlineField::Text(String::new()),
        }
    }
}

#[derive(Debug, PartialOrd, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub base_asset_volume: Option<f64>,
    pub quote_asset_volume: Option<f64>,
}

#[derive(Error, Debug, PartialEq)]
pub enum BNKlineError {
    #[error("Invalid length: {0} fields")]
    InvalidLength(usize),
    #[error("Invalid type: {0}")]
    InvalidType(String),
    #[error("Missing or unparsable {field} at open time {open_time}")]
    MissingField {
        field: &'static str,
        open_time: i64,
    },
}

/// Kline layout: open time, open, high, low, close, volume, close time,
/// quote volume, trade count, taker base, taker quote, ignore.
/// Only the first six are required.
impl TryFrom<Vec<KlineField>> for BNKline {
    type Error = BNKlineError;

    fn try_from(row: Vec<KlineField>) -> std::result::Result<Self, Self::Error> {
        if row.len() < 6 {
            return Err(BNKlineError::InvalidLength(row.len()));
        }
        let open_timestamp_ms = row[0]
            .as_timestamp()
            .ok_or_else(|| BNKlineError::InvalidType("open_time".to_string()))?;

        Ok(BNKline {
            open_timestamp_ms,
            open_price: row[1].as_f64(),
            high_price: row[2].as_f64(),
            low_price: row[3].as_f64(),
            close_price: row[4].as_f64(),
            base_asset_volume: row[5].as_f64(),
            // index 6 is close_time, which we don't use
            quote_asset_volume: row.get(7).and_then(KlineField::as_f64),
        })
    }
}

impl TryFrom<BNKline> for Candle {
    type Error = BNKlineError;

    fn try_from(bn: BNKline) -> std::result::Result<Self, Self::Error> {
        let open_time = bn.open_timestamp_ms;
        let need = |value: Option<f64>, field: &'static str| {
            value.ok_or(BNKlineError::MissingField { field, open_time })
        };
        Ok(Candle::new(
            open_time,
            need(bn.open_price, "open")?,
            need(bn.high_price, "high")?,
            need(bn.low_price, "low")?,
            need(bn.close_price, "close")?,
            need(bn.base_asset_volume, "volume")?,
            bn.quote_asset_volume.unwrap_or_default(),
        ))
    }
}

/// Project raw kline rows into candles. One malformed row fails the batch.
pub fn klines_to_candles(rows: Vec<Vec<KlineField>>, pair_interval: &PairInterval) -> Result<Vec<Candle>> {
    rows.into_iter()
        .map(|row| BNKline::try_from(row).and_then(Candle::try_from))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            BacktestError::data_unavailable(pair_interval.name(), format!("malformed kline: {}", e))
        })
}

fn configure_binance_client() -> Result<RestApi> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()
        .map_err(|e| BacktestError::Network(format!("client configuration failed: {}", e)))?;
    // Create the Spot REST API client
    let rest_client = SpotRestApi::production(rest_conf);
    Ok(rest_client)
}

/// Log a connector failure and decide its class. A symbol or timeframe the
/// exchange rejects is `DataUnavailable`; everything else is `Network`.
fn classify_connector_error(
    conn_err: &errors::ConnectorError,
    pair_interval: &PairInterval,
) -> BacktestError {
    match conn_err {
        connection_error::BadRequestError(msg) | connection_error::NotFoundError(msg) => {
            log::warn!(
                "{} Bad request: is {} a listed symbol? {}",
                pair_interval,
                pair_interval.bn_name(),
                msg
            );
            return BacktestError::data_unavailable(
                pair_interval.name(),
                format!("exchange rejected the request, pick a different symbol or timeframe ({})", msg),
            );
        }
        connection_error::ConnectorClientError(msg) => {
            log::error!(
                "{} Client error: Check your request parameters. {}",
                pair_interval,
                msg
            );
        }
        connection_error::TooManyRequestsError(msg) => {
            log::warn!(
                "{} Rate limit exceeded. Please wait and try again. {}",
                pair_interval,
                msg
            );
        }
        connection_error::NetworkError(msg) => {
            log::error!(
                "{} Network error: Check your internet connection. {}",
                pair_interval,
                msg
            );
        }
        other => {
            log::error!("{} Binance API call failed: {:?}", pair_interval, other);
        }
    }
    BacktestError::Network(format!(
        "Binance API call failed for {}: {}",
        pair_interval, conn_err
    ))
}

async fn fetch_binance_klines(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<Vec<Vec<KlinesItemInner>>> {
    let response_result = rest_client.klines(params).await;
    match response_result {
        Ok(r) => r.data().await.map_err(|e| {
            BacktestError::Network(format!("{} response could not be read: {:#}", pair_interval, e))
        }),
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                Err(classify_connector_error(conn_err, pair_interval))
            } else {
                log::error!(
                    "An unexpected error occurred for {}: {:#}",
                    pair_interval,
                    e
                );
                Err(BacktestError::Network(format!(
                    "Unexpected error during API call for {}: {:#}",
                    pair_interval, e
                )))
            }
        }
    }
}

/// One klines request: the most recent `limit` candles up to `end_time` (inclusive).
pub async fn load_klines(
    pair_interval: &PairInterval,
    limit: usize,
    end_time: Option<i64>,
) -> Result<Vec<Vec<KlineField>>> {
    let interval =
        try_interval_from_ms(pair_interval.interval_ms).map_err(BacktestError::Validation)?;
    let rest_client = configure_binance_client()?;

    let params = KlinesParams::builder(pair_interval.bn_name().to_string(), interval)
        .limit(limit as i32)
        .end_time(end_time)
        .build()
        .map_err(|e| BacktestError::validation(format!("bad klines request: {}", e)))?;

    log::info!(
        "Fetching {} klines for {} (end: {:?})",
        limit,
        pair_interval,
        end_time
    );
    let data = fetch_binance_klines(&rest_client, params, pair_interval).await?;

    Ok(data
        .into_iter()
        .map(|row| row.into_iter().map(KlineField::from).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> PairInterval {
        PairInterval::from_shorthand("BTCUSDT", "1h").unwrap()
    }

    #[test]
    fn parses_exchange_row_encoding() {
        let json = r#"[
            [1700000000000, "37000.10", "37100.00", "36900.50", "37050.00", "12.5",
             1700003599999, "463125.00", 1000, "6.0", "222000.0", "0"]
        ]"#;
        let rows: Vec<Vec<KlineField>> = serde_json::from_str(json).unwrap();
        let candles = klines_to_candles(rows, &pair()).unwrap();

        assert_eq!(candles.len(), 1);
        let c = &candles[0];
        assert_eq!(c.timestamp_ms, 1_700_000_000_000);
        assert_eq!(c.open_price, 37000.10);
        assert_eq!(c.high_price, 37100.00);
        assert_eq!(c.low_price, 36900.50);
        assert_eq!(c.close_price, 37050.00);
        assert_eq!(c.base_asset_volume, 12.5);
        assert_eq!(c.quote_asset_volume, 463125.00);
    }

    #[test]
    fn short_rows_and_bad_prices_are_rejected() {
        let short = vec![vec![KlineField::Integer(1), KlineField::Text("1.0".into())]];
        assert!(matches!(
            klines_to_candles(short, &pair()),
            Err(BacktestError::DataUnavailable { .. })
        ));

        let bad_price = vec![vec![
            KlineField::Integer(1),
            KlineField::Text("abc".into()),
            KlineField::Text("2".into()),
            KlineField::Text("1".into()),
            KlineField::Text("1.5".into()),
            KlineField::Text("3".into()),
        ]];
        let err = BNKline::try_from(bad_price[0].clone())
            .and_then(Candle::try_from)
            .unwrap_err();
        assert_eq!(
            err,
            BNKlineError::MissingField {
                field: "open",
                open_time: 1
            }
        );

        let text_time = vec![KlineField::Text("t".into()); 6];
        assert_eq!(
            BNKline::try_from(text_time).unwrap_err(),
            BNKlineError::InvalidType("open_time".to_string())
        );
    }

    #[test]
    fn unlisted_symbol_is_data_unavailable_not_network() {
        let bad = errors::ConnectorError::BadRequestError("Invalid symbol.".to_string());
        match classify_connector_error(&bad, &pair()) {
            BacktestError::DataUnavailable { pair, reason } => {
                assert_eq!(pair, "BTCUSDT");
                assert!(reason.contains("Invalid symbol."));
            }
            other => panic!("expected data unavailable, got {other}"),
        }

        let missing = errors::ConnectorError::NotFoundError("no such market".to_string());
        assert!(matches!(
            classify_connector_error(&missing, &pair()),
            BacktestError::DataUnavailable { .. }
        ));

        let down = errors::ConnectorError::NetworkError("connection reset".to_string());
        assert!(matches!(
            classify_connector_error(&down, &pair()),
            BacktestError::Network(_)
        ));
        let limited = errors::ConnectorError::TooManyRequestsError("slow down".to_string());
        assert!(matches!(
            classify_connector_error(&limited, &pair()),
            BacktestError::Network(_)
        ));
    }

    #[test]
    fn rejects_unsupported_interval() {
        assert!(try_interval_from_ms(TimeUtils::MS_IN_H).is_ok());
        assert!(try_interval_from_ms(7).is_err());
    }
}

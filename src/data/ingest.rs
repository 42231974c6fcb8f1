use {
    crate::{
        config::BACKTEST,
        domain::{Candle, PairInterval},
        error::{BacktestError, Result},
    },
    itertools::Itertools,
};

/// Turn fetched candles into a series the backtest can trust.
///
/// Unusable candles are dropped with a warning, the rest are put in time
/// order. Duplicate open times, or fewer than `BACKTEST.min_viable_candles`
/// survivors, make the data unavailable. Nothing is ever synthesised.
pub fn validate_series(pair_interval: &PairInterval, candles: Vec<Candle>) -> Result<Vec<Candle>> {
    let received = candles.len();
    let mut usable: Vec<Candle> = candles
        .into_iter()
        .filter(|c| match c.defect() {
            Some(reason) => {
                log::warn!(
                    "{}: dropping candle at {}: {}",
                    pair_interval.name(),
                    c.timestamp_ms,
                    reason
                );
                false
            }
            None => true,
        })
        .collect();

    usable.sort_by_key(|c| c.timestamp_ms);

    if let Some((a, _)) = usable
        .iter()
        .tuple_windows()
        .find(|(a, b)| a.timestamp_ms == b.timestamp_ms)
    {
        return Err(BacktestError::data_unavailable(
            pair_interval.name(),
            format!("duplicate candle open time {}", a.timestamp_ms),
        ));
    }

    if usable.len() < BACKTEST.min_viable_candles {
        return Err(BacktestError::data_unavailable(
            pair_interval.name(),
            format!(
                "{} usable candles of {} received, need at least {}",
                usable.len(),
                received,
                BACKTEST.min_viable_candles
            ),
        ));
    }

    log::debug!("{}: {} candles accepted", pair_interval, usable.len());
    Ok(usable)
}

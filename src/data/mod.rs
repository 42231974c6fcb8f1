mod bn_kline;
mod ingest;
mod provider;
mod result_io;

pub use {
    bn_kline::{BNKline, BNKlineError, KlineField, klines_to_candles, load_klines},
    ingest::validate_series,
    provider::{BinanceProvider, CandleSource, JsonFileProvider},
    result_io::{load_result, load_saved_results, save_result},
};

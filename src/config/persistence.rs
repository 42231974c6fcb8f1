//! File persistence and serialization configuration

/// Configuration for saved backtest results
pub struct ResultPersistenceConfig {
    /// Directory results are written to by default
    pub directory: &'static str,
    /// Current version of the result envelope format
    pub version: u32,
}

/// Configuration for raw kline dumps
pub struct KlineDumpConfig {
    pub directory: &'static str,
    pub filename_base: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub result: ResultPersistenceConfig,
    pub kline: KlineDumpConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    result: ResultPersistenceConfig {
        directory: "backtests",
        version: 1,
    },
    kline: KlineDumpConfig {
        directory: "kline_data",
        filename_base: "klines",
    },
};

/// Example: "klines_BTCUSDT_1h.json"
pub fn kline_dump_filename(symbol: &str, interval: &str) -> String {
    format!("{}_{}_{}.json", PERSISTENCE.kline.filename_base, symbol, interval)
}

/// Example: "BTCUSDT_1h_ma-crossover.json"
pub fn result_filename(symbol: &str, interval: &str, strategy: &str) -> String {
    format!("{}_{}_{}.json", symbol, interval, strategy)
}

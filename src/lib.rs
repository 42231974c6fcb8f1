#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types outside of crate (for the binaries and tests)
pub use config::{BACKTEST, PERSISTENCE};
pub use data::{BinanceProvider, CandleSource, JsonFileProvider};
pub use domain::{Candle, PairInterval};
pub use engine::{BacktestRequest, compare_strategies, fetch_and_run, run_backtest};
pub use error::{BacktestError, Result};
pub use models::{BacktestResult, BacktestStats, StrategyKind};

// CLI argument parsing
use {
    clap::{Args, Parser, Subcommand},
    config::PositionFraction,
    std::path::PathBuf,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Backtest simple long-only strategies on exchange candles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch candles and backtest one strategy
    Run(RunArgs),
    /// Fetch candles once and backtest every strategy on them
    Compare(RunArgs),
    /// Print a previously saved result
    Show {
        /// Saved result file
        path: PathBuf,
    },
    /// Summarise every saved result in a directory
    List {
        #[arg(long, default_value = PERSISTENCE.result.directory)]
        dir: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Trading pair, e.g. BTCUSDT
    #[arg(short, long, default_value = BACKTEST.default_symbol)]
    pub symbol: String,

    /// Candle interval shorthand (1m, 5m, 1h, 4h, 1d, ...)
    #[arg(short, long, default_value = BACKTEST.default_interval)]
    pub interval: String,

    /// Strategy rule (ignored by `compare`)
    #[arg(long, default_value_t = StrategyKind::default())]
    pub strategy: StrategyKind,

    /// Starting capital in quote currency
    #[arg(short, long, default_value_t = BACKTEST.default_capital)]
    pub capital: f64,

    /// Number of candles to fetch (60..=1000)
    #[arg(short, long, default_value_t = BACKTEST.default_limit)]
    pub limit: usize,

    /// Only use candles opening at or before this epoch-ms time
    #[arg(long)]
    pub end_time: Option<i64>,

    /// Fraction of capital committed per entry, in (0, 1]
    #[arg(long, default_value_t = BACKTEST.position_fraction.value())]
    pub position_fraction: f64,

    /// Replay a klines dump from disk instead of calling the exchange
    #[arg(long)]
    pub klines_file: Option<PathBuf>,

    /// Save each result as JSON under the results directory
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Write trades and equity curve CSVs into this directory
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the equity chart SVG into this directory
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Print the full result as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl RunArgs {
    /// Turn the flags into a request. Remaining range checks are left to [`BacktestRequest::validate`].
    pub fn to_request(&self) -> Result<BacktestRequest> {
        let pair_interval = PairInterval::from_shorthand(&self.symbol, &self.interval)
            .ok_or_else(|| {
                BacktestError::Validation(format!("unsupported interval '{}'", self.interval))
            })?;
        let mut request = BacktestRequest::new(pair_interval, self.strategy, self.capital);
        request.limit = self.limit;
        request.end_time_ms = self.end_time;
        request.position_fraction =
            PositionFraction::try_new(self.position_fraction).ok_or_else(|| {
                BacktestError::Validation(format!(
                    "position fraction must be in (0, 1], got {}",
                    self.position_fraction
                ))
            })?;
        Ok(request)
    }

    /// The file provider when `--klines-file` is given, the exchange otherwise.
    pub fn source(&self) -> Box<dyn CandleSource> {
        match &self.klines_file {
            Some(path) => Box::new(JsonFileProvider::new(path.clone())),
            None => Box::new(BinanceProvider::new()),
        }
    }
}

use {
    anyhow::{Context, Result, bail},
    clap::Parser,
    kline_backtester::{
        BACKTEST, PERSISTENCE, PairInterval,
        config::{BINANCE, kline_dump_filename},
        data::load_klines,
    },
    std::path::PathBuf,
};

/// Download raw klines once so later backtests can replay them with `--klines-file`.
#[derive(Parser, Debug)]
#[command(author, version, about = "Dump exchange klines to a JSON file")]
struct Args {
    #[arg(short, long, default_value = BACKTEST.default_symbol)]
    symbol: String,

    #[arg(short, long, default_value = BACKTEST.default_interval)]
    interval: String,

    #[arg(short, long, default_value_t = BINANCE.limits.klines_limit as usize)]
    limit: usize,

    /// Epoch-ms open time of the newest candle wanted
    #[arg(long)]
    end_time: Option<i64>,

    /// Output file. Defaults to the kline dump directory.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let max = BINANCE.limits.klines_limit as usize;
    if args.limit == 0 || args.limit > max {
        bail!("limit must be between 1 and {}, got {}", max, args.limit);
    }

    let pair_interval = PairInterval::from_shorthand(&args.symbol, &args.interval)
        .with_context(|| format!("Unsupported interval '{}'", args.interval))?;

    // 2. Fetch
    let rows = load_klines(&pair_interval, args.limit, args.end_time)
        .await
        .with_context(|| format!("Failed to fetch klines for {}", pair_interval))?;
    if rows.is_empty() {
        log::warn!("⚠ Exchange returned no klines for {}", pair_interval);
    }

    // 3. Write
    let path = args.out.unwrap_or_else(|| {
        PathBuf::from(PERSISTENCE.kline.directory).join(kline_dump_filename(
            pair_interval.name(),
            pair_interval.interval_str(),
        ))
    });
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string(&rows)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("✅ Wrote {} klines for {} to {}", rows.len(), pair_interval, path.display());
    Ok(())
}

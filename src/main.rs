use {
    anyhow::{Context, Result},
    clap::Parser,
    kline_backtester::{
        BacktestResult, Cli, Command, PERSISTENCE, RunArgs, compare_strategies,
        config::result_filename,
        data::{load_result, load_saved_results, save_result, validate_series},
        fetch_and_run,
        report::{CsvReport, SvgOptions, comparison_table, equity_svg, stats_table, trades_table},
    },
    std::{panic, path::Path},
};

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("kline_backtester"), my_code_level)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    match args.command {
        Command::Run(run) => run_one(&run).await,
        Command::Compare(run) => run_all(&run).await,
        Command::Show { path } => {
            let result = load_result(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            print_result(&result);
            Ok(())
        }
        Command::List { dir } => {
            let results = load_saved_results(&dir)?;
            if results.is_empty() {
                println!("No saved results in {}", dir.display());
            }
            for r in &results {
                println!(
                    "{:<28} {:<20} trades {:>4}  return {:+8.2}%  buy&hold {:+8.2}%",
                    r.pair_interval.to_string(),
                    r.strategy.to_string(),
                    r.stats.total_trades,
                    r.stats.total_return_pct,
                    r.stats.buy_hold_return_pct
                );
            }
            Ok(())
        }
    }
}

async fn run_one(run: &RunArgs) -> Result<()> {
    let request = run.to_request()?;
    let source = run.source();
    let result = fetch_and_run(source.as_ref(), &request)
        .await
        .with_context(|| format!("Backtest failed for {}", request.pair_interval))?;

    if run.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    export(run, &result)
}

async fn run_all(run: &RunArgs) -> Result<()> {
    let request = run.to_request()?;
    request.validate()?;

    let source = run.source();
    let raw = source
        .fetch_candles(&request.pair_interval, request.limit, request.end_time_ms)
        .await
        .with_context(|| format!("Failed to fetch candles for {}", request.pair_interval))?;
    let candles = validate_series(&request.pair_interval, raw)?;

    let results = compare_strategies(&request, &candles);
    if run.json {
        let ok: Vec<&BacktestResult> = results.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
        println!("{}", serde_json::to_string_pretty(&ok)?);
    } else {
        println!("{} | {} candles", request.pair_interval, candles.len());
        println!("{}", comparison_table(&results));
    }

    for (kind, outcome) in &results {
        match outcome {
            Ok(result) => export(run, result)?,
            Err(e) => log::warn!("{} failed: {}", kind, e),
        }
    }
    Ok(())
}

fn print_result(result: &BacktestResult) {
    println!("{}", stats_table(result));
    println!("{}", trades_table(&result.trades));
}

/// Optional side outputs, all keyed by the same file stem.
fn export(run: &RunArgs, result: &BacktestResult) -> Result<()> {
    let stem = result_filename(
        result.pair_interval.name(),
        result.pair_interval.interval_str(),
        &result.strategy.to_string(),
    );
    let stem = stem.trim_end_matches(".json");

    if run.save {
        let path = Path::new(PERSISTENCE.result.directory).join(format!("{}.json", stem));
        save_result(&path, result)?;
        log::info!("Saved result to {}", path.display());
    }
    if let Some(dir) = &run.csv {
        CsvReport::trades(&result.trades).save(&dir.join(format!("{}_trades.csv", stem)))?;
        CsvReport::equity(&result.equity_curve).save(&dir.join(format!("{}_equity.csv", stem)))?;
    }
    if let Some(dir) = &run.svg {
        std::fs::create_dir_all(dir)?;
        let title = format!("{} | {}", result.pair_interval, result.strategy);
        let svg = equity_svg(&result.equity_curve, &title, &SvgOptions::default());
        let path = dir.join(format!("{}_equity.svg", stem));
        std::fs::write(&path, svg)?;
        log::info!("Wrote equity chart to {}", path.display());
    }
    Ok(())
}

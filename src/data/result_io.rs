use {
    crate::{
        config::PERSISTENCE,
        error::{BacktestError, Result},
        models::BacktestResult,
    },
    serde::{Deserialize, Serialize},
    std::{
        fs::{self, File},
        io::{BufReader, BufWriter},
        path::Path,
    },
};

#[derive(Serialize)]
struct ResultEnvelopeRef<'a> {
    version: u32,
    result: &'a BacktestResult,
}

#[derive(Deserialize)]
struct ResultEnvelope {
    version: u32,
    result: BacktestResult,
}

/// Write `result` as a versioned JSON envelope, creating parent directories.
pub fn save_result(path: &Path, result: &BacktestResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(
        writer,
        &ResultEnvelopeRef {
            version: PERSISTENCE.result.version,
            result,
        },
    )?;
    Ok(())
}

/// Load a saved result. A different envelope version is a validation error.
pub fn load_result(path: &Path) -> Result<BacktestResult> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let envelope: ResultEnvelope = serde_json::from_reader(reader)?;
    if envelope.version != PERSISTENCE.result.version {
        return Err(BacktestError::validation(format!(
            "{} has result format v{}, expected v{}",
            path.display(),
            envelope.version,
            PERSISTENCE.result.version
        )));
    }
    Ok(envelope.result)
}

/// Every loadable result in `dir`, sorted by file name.
///
/// A missing directory is an empty list. Unreadable files are skipped.
pub fn load_saved_results(dir: &Path) -> Result<Vec<BacktestResult>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let results = paths
        .iter()
        .filter_map(|p| match load_result(p) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("Skipping {}: {}", p.display(), e);
                None
            }
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::PairInterval,
        engine::compute_stats,
        models::{EquityPoint, StrategyKind},
    };
    use tempfile::tempdir;

    fn sample() -> BacktestResult {
        let curve = vec![
            EquityPoint {
                timestamp_ms: 0,
                strategy_equity: 1_000.0,
                buy_hold_equity: 1_000.0,
            },
            EquityPoint {
                timestamp_ms: 60_000,
                strategy_equity: 1_010.0,
                buy_hold_equity: 1_050.0,
            },
        ];
        BacktestResult {
            pair_interval: PairInterval::from_shorthand("SOLUSDT", "1m").unwrap(),
            strategy: StrategyKind::Breakout,
            trades: vec![],
            stats: compute_stats(1_000.0, &[], &curve),
            equity_curve: curve,
        }
    }

    #[test]
    fn saved_result_reloads_equal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");
        let result = sample();
        save_result(&path, &result).unwrap();
        assert_eq!(load_result(&path).unwrap(), result);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.json");
        let body = serde_json::json!({ "version": 0, "result": sample() });
        fs::write(&path, body.to_string()).unwrap();
        assert!(matches!(
            load_result(&path),
            Err(BacktestError::Validation(_))
        ));
    }

    #[test]
    fn directory_listing_defaults_to_empty_and_skips_junk() {
        let dir = tempdir().unwrap();
        assert!(load_saved_results(&dir.path().join("missing")).unwrap().is_empty());

        save_result(&dir.path().join("a.json"), &sample()).unwrap();
        fs::write(dir.path().join("b.json"), "not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(load_saved_results(dir.path()).unwrap().len(), 1);
    }
}

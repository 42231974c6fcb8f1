use {
    crate::{
        error::Result,
        models::{EquityPoint, Trade},
        utils::epoch_ms_to_utc,
    },
    std::{fs, path::Path},
};

/// Line buffer for a CSV export. Header first, one row per record.
pub struct CsvReport {
    buffer: Vec<String>,
}

impl CsvReport {
    pub fn trades(trades: &[Trade]) -> Self {
        let mut buffer = Vec::with_capacity(trades.len() + 1);
        buffer.push(
            "Entry_Time_Ms,Entry_Utc,Entry_Price,Exit_Time_Ms,Exit_Utc,Exit_Price,Quantity,Pnl,Pnl_Pct,Exit_Reason"
                .to_string(),
        );
        buffer.extend(trades.iter().map(|t| {
            format!(
                "{},{},{},{},{},{},{},{:.8},{:.4},{}",
                t.entry_time_ms,
                epoch_ms_to_utc(t.entry_time_ms),
                t.entry_price,
                t.exit_time_ms,
                epoch_ms_to_utc(t.exit_time_ms),
                t.exit_price,
                t.quantity,
                t.pnl,
                t.pnl_pct,
                t.exit_reason,
            )
        }));
        Self { buffer }
    }

    pub fn equity(curve: &[EquityPoint]) -> Self {
        let mut buffer = Vec::with_capacity(curve.len() + 1);
        buffer.push("Timestamp_Ms,Utc,Strategy_Equity,Buy_Hold_Equity".to_string());
        buffer.extend(curve.iter().map(|p| {
            format!(
                "{},{},{:.8},{:.8}",
                p.timestamp_ms,
                epoch_ms_to_utc(p.timestamp_ms),
                p.strategy_equity,
                p.buy_hold_equity
            )
        }));
        Self { buffer }
    }

    /// Data rows, excluding the header.
    pub fn row_count(&self) -> usize {
        self.buffer.len().saturating_sub(1)
    }

    pub fn to_csv_string(&self) -> String {
        let mut out = self.buffer.join("\n");
        out.push('\n');
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_csv_string())?;
        log::info!("Wrote {} CSV rows to {}", self.row_count(), path.display());
        Ok(())
    }
}

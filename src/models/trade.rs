use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Long,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "LONG"),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// The strategy emitted an exit.
    Signal,
    /// Still open on the last candle.
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => write!(f, "Signal"),
            ExitReason::EndOfData => write!(f, "End of data"),
        }
    }
}

/// A closed round trip. `entry_time_ms < exit_time_ms` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub direction: TradeDirection,
    pub entry_time_ms: i64,
    pub entry_price: f64,
    pub exit_time_ms: i64,
    pub exit_price: f64,
    /// Units of the base asset held.
    pub quantity: f64,
    /// Realised profit in quote currency.
    pub pnl: f64,
    /// Price move over the trade, in percent.
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }

    pub fn holding_ms(&self) -> i64 {
        self.exit_time_ms - self.entry_time_ms
    }
}

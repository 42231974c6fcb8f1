use serde::{Deserialize, Serialize};

/// Account value at the close of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp_ms: i64,
    /// Capital plus the mark-to-market value of any open position.
    pub strategy_equity: f64,
    /// Initial capital scaled by the price ratio since the first candle.
    pub buy_hold_equity: f64,
}

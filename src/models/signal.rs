use {
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

/// Per-candle decision produced by a strategy rule. Long-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
pub enum StrategySignal {
    #[strum(to_string = "ENTER_LONG")]
    EnterLong,
    #[strum(to_string = "EXIT_LONG")]
    ExitLong,
    #[default]
    #[strum(to_string = "HOLD")]
    Hold,
}

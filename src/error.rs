use thiserror::Error;

/// Everything a backtest run can fail with.
///
/// None of these are fatal: the caller reports them and lets the user re-run.
#[derive(Error, Debug)]
pub enum BacktestError {
    /// The exchange (or file) produced no usable candles, or too few of them.
    #[error("data unavailable for {pair}: {reason}")]
    DataUnavailable { pair: String, reason: String },

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed user input, caught before any fetch.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BacktestError {
    pub(crate) fn data_unavailable(pair: &str, reason: impl Into<String>) -> Self {
        BacktestError::DataUnavailable {
            pair: pair.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        BacktestError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BacktestError>;

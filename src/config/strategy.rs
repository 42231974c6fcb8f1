//! Default indicator parameters for each strategy rule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaCrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReversionParams {
    pub period: usize,
    pub oversold: f64,
    /// Exit once RSI climbs back to this level (neutral or above).
    pub exit_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub period: usize,
    pub std_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutParams {
    pub lookback: usize,
    /// Breakout volume must reach this multiple of the lookback average.
    pub volume_multiplier: f64,
    pub exit_lookback: usize,
    pub trailing_stop_pct: f64,
}

/// Full parameter set. Each strategy reads only its own block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub ma_crossover: MaCrossoverParams,
    pub rsi_reversion: RsiReversionParams,
    pub bollinger: BollingerParams,
    pub breakout: BreakoutParams,
}

impl Default for StrategyParams {
    fn default() -> Self {
        STRATEGY
    }
}

pub const STRATEGY: StrategyParams = StrategyParams {
    ma_crossover: MaCrossoverParams {
        fast_period: 9,
        slow_period: 21,
    },
    rsi_reversion: RsiReversionParams {
        period: 14,
        oversold: 30.0,
        exit_level: 50.0,
    },
    bollinger: BollingerParams {
        period: 20,
        std_multiplier: 2.0,
    },
    breakout: BreakoutParams {
        lookback: 20,
        volume_multiplier: 1.5,
        exit_lookback: 10,
        trailing_stop_pct: 0.05,
    },
};

use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString},
};

/// The strategy rules a backtest can be run with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Ord,
    PartialOrd,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StrategyKind {
    /// Fast SMA crossing the slow SMA.
    #[default]
    MaCrossover,
    /// RSI oversold entry, exit back at neutral.
    RsiReversion,
    /// Close below the lower Bollinger band, exit at the middle band.
    BollingerReversion,
    /// Close above the trailing high on heavy volume, trailing-stop exit.
    Breakout,
}

impl StrategyKind {
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::MaCrossover => "Moving-average crossover",
            StrategyKind::RsiReversion => "RSI mean reversion",
            StrategyKind::BollingerReversion => "Bollinger mean reversion",
            StrategyKind::Breakout => "Volume-confirmed breakout",
        }
    }
}

use serde::{Deserialize, Serialize};

/// Fraction of current capital put into a single position, kept in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionFraction(f64);

impl PositionFraction {
    pub const FULL: Self = Self(1.0);

    pub const fn new(val: f64) -> Self {
        let v = if val > 1.0 { 1.0 } else { val };
        Self(v)
    }

    /// Strict constructor for user input: rejects anything outside (0, 1].
    pub fn try_new(val: f64) -> Option<Self> {
        if val.is_finite() && val > 0.0 && val <= 1.0 {
            Some(Self(val))
        } else {
            None
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for PositionFraction {
    fn default() -> Self {
        crate::config::BACKTEST.position_fraction
    }
}

impl std::fmt::Display for PositionFraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.)
    }
}

use serde::{Deserialize, Serialize};

/// Direction of the candle body. A flat candle counts as bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One OHLCV sample for a fixed time bucket, keyed by its open time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub base_asset_volume: f64,
    pub quote_asset_volume: f64,
}

impl Candle {
    pub fn new(
        timestamp_ms: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        base_vol: f64,
        quote_vol: f64,
    ) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            base_asset_volume: base_vol,
            quote_asset_volume: quote_vol,
        }
    }

    pub fn get_type(&self) -> CandleType {
        if self.close_price >= self.open_price {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    /// `(low, high)` of the open/close body.
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open_price, self.close_price),
            CandleType::Bearish => (self.close_price, self.open_price),
        }
    }

    /// Explains why the candle is unusable, or `None` if it is fine.
    pub fn defect(&self) -> Option<&'static str> {
        let prices = [self.open_price, self.high_price, self.low_price, self.close_price];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Some("non-positive or non-finite price");
        }
        let (body_low, body_high) = self.body_range();
        if self.low_price > body_low || self.high_price < body_high {
            return Some("high/low do not bracket open/close");
        }
        let volumes = [self.base_asset_volume, self.quote_asset_volume];
        if volumes.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Some("negative or non-finite volume");
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.defect().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_broken_candles() {
        let ok = Candle::new(0, 10.0, 12.0, 9.0, 11.0, 5.0, 55.0);
        assert!(ok.is_valid());
        assert_eq!(ok.body_range(), (10.0, 11.0));

        let zero_price = Candle::new(0, 0.0, 12.0, 9.0, 11.0, 5.0, 55.0);
        assert!(!zero_price.is_valid());

        let high_below_close = Candle::new(0, 10.0, 10.5, 9.0, 11.0, 5.0, 55.0);
        assert_eq!(
            high_below_close.defect(),
            Some("high/low do not bracket open/close")
        );

        let negative_volume = Candle::new(0, 10.0, 12.0, 9.0, 11.0, -1.0, 55.0);
        assert!(!negative_volume.is_valid());
    }
}

//! Indicator-driven entry/exit rules.
//!
//! Every rule feeds its indicators strictly in candle order, so the signal at
//! index `i` is a pure function of `candles[..=i]`. While an indicator is still
//! warming up the rule answers [`StrategySignal::Hold`].

use {
    crate::{
        config::{BollingerParams, BreakoutParams, MaCrossoverParams, RsiReversionParams},
        domain::Candle,
        error::{BacktestError, Result},
        models::{StrategyKind, StrategySignal},
    },
    ta::{
        Next,
        errors::TaError,
        indicators::{
            BollingerBands, Maximum, Minimum, RelativeStrengthIndex, SimpleMovingAverage,
        },
    },
};

/// A strategy that classifies every candle of a series.
pub trait SignalRule: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Candles needed before the rule can say anything other than `Hold`.
    fn warmup(&self) -> usize;

    /// One signal per input candle.
    fn evaluate(&self, candles: &[Candle]) -> Result<Vec<StrategySignal>>;
}

fn ta_err(context: &str, e: TaError) -> BacktestError {
    BacktestError::validation(format!("{}: invalid indicator parameter ({:?})", context, e))
}

// ─── Moving-average crossover ────────────────────────────────────────────────

pub struct MaCrossoverRule {
    params: MaCrossoverParams,
}

impl MaCrossoverRule {
    pub fn new(params: MaCrossoverParams) -> Result<Self> {
        if params.fast_period == 0 || params.fast_period >= params.slow_period {
            return Err(BacktestError::validation(format!(
                "ma-crossover needs 0 < fast ({}) < slow ({})",
                params.fast_period, params.slow_period
            )));
        }
        Ok(Self { params })
    }
}

impl SignalRule for MaCrossoverRule {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MaCrossover
    }

    fn warmup(&self) -> usize {
        self.params.slow_period
    }

    fn evaluate(&self, candles: &[Candle]) -> Result<Vec<StrategySignal>> {
        let mut fast = SimpleMovingAverage::new(self.params.fast_period)
            .map_err(|e| ta_err("ma-crossover fast", e))?;
        let mut slow = SimpleMovingAverage::new(self.params.slow_period)
            .map_err(|e| ta_err("ma-crossover slow", e))?;

        // None until both averages are warm. The first warm candle with fast above
        // slow counts as a cross from "unknown".
        let mut prev_above: Option<bool> = None;
        let mut signals = Vec::with_capacity(candles.len());

        for (i, candle) in candles.iter().enumerate() {
            let fast_ma = fast.next(candle.close_price);
            let slow_ma = slow.next(candle.close_price);
            if i + 1 < self.warmup() {
                signals.push(StrategySignal::Hold);
                continue;
            }

            let above = fast_ma > slow_ma;
            let signal = match (prev_above, above) {
                (Some(true), true) => StrategySignal::Hold,
                (_, true) => StrategySignal::EnterLong,
                (Some(true), false) => StrategySignal::ExitLong,
                (_, false) => StrategySignal::Hold,
            };
            prev_above = Some(above);
            signals.push(signal);
        }
        Ok(signals)
    }
}

// ─── RSI mean reversion ──────────────────────────────────────────────────────

pub struct RsiReversionRule {
    params: RsiReversionParams,
}

impl RsiReversionRule {
    pub fn new(params: RsiReversionParams) -> Result<Self> {
        let levels_ok = params.oversold > 0.0
            && params.exit_level < 100.0
            && params.oversold < params.exit_level;
        if params.period == 0 || !levels_ok {
            return Err(BacktestError::validation(format!(
                "rsi-reversion needs period > 0 and 0 < oversold ({}) < exit ({}) < 100",
                params.oversold, params.exit_level
            )));
        }
        Ok(Self { params })
    }
}

impl SignalRule for RsiReversionRule {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RsiReversion
    }

    // RSI needs `period` price changes, i.e. one extra candle.
    fn warmup(&self) -> usize {
        self.params.period + 1
    }

    fn evaluate(&self, candles: &[Candle]) -> Result<Vec<StrategySignal>> {
        let mut rsi = RelativeStrengthIndex::new(self.params.period)
            .map_err(|e| ta_err("rsi-reversion", e))?;

        let signals = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| {
                let value = rsi.next(candle.close_price);
                if i + 1 < self.warmup() {
                    StrategySignal::Hold
                } else if value <= self.params.oversold {
                    StrategySignal::EnterLong
                } else if value >= self.params.exit_level {
                    StrategySignal::ExitLong
                } else {
                    StrategySignal::Hold
                }
            })
            .collect();
        Ok(signals)
    }
}

// ─── Bollinger mean reversion ────────────────────────────────────────────────

pub struct BollingerReversionRule {
    params: BollingerParams,
}

impl BollingerReversionRule {
    pub fn new(params: BollingerParams) -> Result<Self> {
        if params.period < 2 || !params.std_multiplier.is_finite() || params.std_multiplier <= 0.0 {
            return Err(BacktestError::validation(format!(
                "bollinger-reversion needs period >= 2 and multiplier > 0 (got {}, {})",
                params.period, params.std_multiplier
            )));
        }
        Ok(Self { params })
    }
}

impl SignalRule for BollingerReversionRule {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerReversion
    }

    fn warmup(&self) -> usize {
        self.params.period
    }

    fn evaluate(&self, candles: &[Candle]) -> Result<Vec<StrategySignal>> {
        let mut bands = BollingerBands::new(self.params.period, self.params.std_multiplier)
            .map_err(|e| ta_err("bollinger-reversion", e))?;

        let signals = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| {
                let out = bands.next(candle.close_price);
                if i + 1 < self.warmup() {
                    StrategySignal::Hold
                } else if candle.close_price < out.lower {
                    StrategySignal::EnterLong
                } else if candle.close_price >= out.average {
                    StrategySignal::ExitLong
                } else {
                    StrategySignal::Hold
                }
            })
            .collect();
        Ok(signals)
    }
}

// ─── Volume-confirmed breakout ───────────────────────────────────────────────

pub struct BreakoutRule {
    params: BreakoutParams,
}

impl BreakoutRule {
    pub fn new(params: BreakoutParams) -> Result<Self> {
        let pct_ok = params.trailing_stop_pct > 0.0 && params.trailing_stop_pct < 1.0;
        if params.lookback == 0 || params.exit_lookback == 0 || !pct_ok {
            return Err(BacktestError::validation(format!(
                "breakout needs lookbacks > 0 and 0 < trailing stop ({}) < 1",
                params.trailing_stop_pct
            )));
        }
        if !params.volume_multiplier.is_finite() || params.volume_multiplier < 0.0 {
            return Err(BacktestError::validation(
                "breakout volume multiplier must be >= 0",
            ));
        }
        Ok(Self { params })
    }
}

impl SignalRule for BreakoutRule {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Breakout
    }

    // Entries compare against the previous `lookback` candles.
    fn warmup(&self) -> usize {
        self.params.lookback + 1
    }

    fn evaluate(&self, candles: &[Candle]) -> Result<Vec<StrategySignal>> {
        let p = &self.params;
        let mut highest_high =
            Maximum::new(p.lookback).map_err(|e| ta_err("breakout high", e))?;
        let mut avg_volume =
            SimpleMovingAverage::new(p.lookback).map_err(|e| ta_err("breakout volume", e))?;
        let mut lowest_low =
            Minimum::new(p.exit_lookback).map_err(|e| ta_err("breakout low", e))?;
        let mut peak_close =
            Maximum::new(p.exit_lookback).map_err(|e| ta_err("breakout trail", e))?;

        // Window statistics over the candles *before* the current one.
        let mut prior_high = f64::NAN;
        let mut prior_avg_volume = f64::NAN;
        let mut prior_low = f64::NAN;

        let mut signals = Vec::with_capacity(candles.len());
        for (i, candle) in candles.iter().enumerate() {
            let close = candle.close_price;
            let recent_peak = peak_close.next(close);

            let breakout = i >= p.lookback
                && close > prior_high
                && candle.base_asset_volume >= prior_avg_volume * p.volume_multiplier;
            let trailing_hit = i >= p.exit_lookback
                && close < recent_peak * (1.0 - p.trailing_stop_pct);
            let reversal = i >= p.exit_lookback && close < prior_low;

            let signal = if breakout {
                StrategySignal::EnterLong
            } else if trailing_hit || reversal {
                StrategySignal::ExitLong
            } else {
                StrategySignal::Hold
            };
            signals.push(signal);

            prior_high = highest_high.next(candle.high_price);
            prior_avg_volume = avg_volume.next(candle.base_asset_volume);
            prior_low = lowest_low.next(candle.low_price);
        }
        Ok(signals)
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Build the rule for `kind`, validating its parameters.
pub fn rule_for(
    kind: StrategyKind,
    params: &crate::config::StrategyParams,
) -> Result<Box<dyn SignalRule>> {
    let rule: Box<dyn SignalRule> = match kind {
        StrategyKind::MaCrossover => Box::new(MaCrossoverRule::new(params.ma_crossover)?),
        StrategyKind::RsiReversion => Box::new(RsiReversionRule::new(params.rsi_reversion)?),
        StrategyKind::BollingerReversion => {
            Box::new(BollingerReversionRule::new(params.bollinger)?)
        }
        StrategyKind::Breakout => Box::new(BreakoutRule::new(params.breakout)?),
    };
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STRATEGY;
    use strum::IntoEnumIterator;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60_000, c, c * 1.01, c * 0.99, c, 100.0, 100.0 * c))
            .collect()
    }

    fn count(signals: &[StrategySignal], wanted: StrategySignal) -> usize {
        signals.iter().filter(|s| **s == wanted).count()
    }

    #[test]
    fn crossover_enters_once_on_uptrend() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let rule = MaCrossoverRule::new(STRATEGY.ma_crossover).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();

        assert_eq!(signals.len(), 100);
        assert_eq!(count(&signals, StrategySignal::EnterLong), 1);
        assert_eq!(count(&signals, StrategySignal::ExitLong), 0);
        assert_eq!(signals[rule.warmup() - 1], StrategySignal::EnterLong);
        assert!(signals[..rule.warmup() - 1].iter().all(|s| *s == StrategySignal::Hold));
    }

    #[test]
    fn crossover_never_enters_on_downtrend() {
        let closes: Vec<f64> = (0..100).map(|i| 500.0 - i as f64).collect();
        let rule = MaCrossoverRule::new(STRATEGY.ma_crossover).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();
        assert!(signals.iter().all(|s| *s == StrategySignal::Hold));
    }

    #[test]
    fn crossover_exits_when_trend_turns() {
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..60).map(|i| 159.0 - 2.0 * i as f64));
        let rule = MaCrossoverRule::new(STRATEGY.ma_crossover).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();
        let enter = signals.iter().position(|s| *s == StrategySignal::EnterLong).unwrap();
        let exit = signals.iter().position(|s| *s == StrategySignal::ExitLong).unwrap();
        assert!(enter < exit);
        assert!(exit > 60);
    }

    #[test]
    fn short_history_is_all_hold() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let candles = candles_from_closes(&closes);
        for kind in StrategyKind::iter() {
            let rule = rule_for(kind, &STRATEGY).unwrap();
            let signals = rule.evaluate(&candles).unwrap();
            assert_eq!(signals.len(), candles.len());
            assert!(
                signals.iter().all(|s| *s == StrategySignal::Hold),
                "{} emitted a signal before warm-up",
                kind
            );
        }
    }

    #[test]
    fn rsi_enters_after_a_selloff() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64).collect();
        closes.extend((0..20).map(|i| 100.0 - 3.0 * i as f64));
        closes.extend((0..20).map(|i| 43.0 + 3.0 * i as f64));
        let rule = RsiReversionRule::new(STRATEGY.rsi_reversion).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();
        let enter = signals.iter().position(|s| *s == StrategySignal::EnterLong).unwrap();
        assert!((20..40).contains(&enter));
        assert!(signals[40..].contains(&StrategySignal::ExitLong));
    }

    #[test]
    fn bollinger_enters_below_lower_band() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        closes.push(80.0);
        closes.extend(std::iter::repeat_n(101.0, 5));
        let rule = BollingerReversionRule::new(STRATEGY.bollinger).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();
        assert_eq!(signals[30], StrategySignal::EnterLong);
        assert!(signals[31..].contains(&StrategySignal::ExitLong));
    }

    #[test]
    fn breakout_needs_volume_confirmation() {
        let mut candles = candles_from_closes(&vec![100.0; 30]);
        candles.push(Candle::new(30 * 60_000, 100.0, 106.0, 100.0, 105.0, 500.0, 52_500.0));
        candles.push(Candle::new(31 * 60_000, 105.0, 111.0, 105.0, 110.0, 100.0, 11_000.0));

        let rule = BreakoutRule::new(STRATEGY.breakout).unwrap();
        let signals = rule.evaluate(&candles).unwrap();
        assert_eq!(signals[30], StrategySignal::EnterLong);
        // Higher close, but on ordinary volume.
        assert_eq!(signals[31], StrategySignal::Hold);
    }

    #[test]
    fn breakout_trailing_stop_exits() {
        let mut closes: Vec<f64> = vec![100.0; 25];
        closes.extend([110.0, 112.0, 104.0]);
        let rule = BreakoutRule::new(STRATEGY.breakout).unwrap();
        let signals = rule.evaluate(&candles_from_closes(&closes)).unwrap();
        assert_eq!(signals[27], StrategySignal::ExitLong);
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad = MaCrossoverParams {
            fast_period: 30,
            slow_period: 10,
        };
        assert!(matches!(
            MaCrossoverRule::new(bad),
            Err(BacktestError::Validation(_))
        ));
        let bad_rsi = RsiReversionParams {
            period: 14,
            oversold: 60.0,
            exit_level: 50.0,
        };
        assert!(RsiReversionRule::new(bad_rsi).is_err());
    }
}

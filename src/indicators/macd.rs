//! MACD (Moving Average Convergence Divergence).
//!
//! line      = EMA(close, fast) - EMA(close, slow)
//! signal    = EMA(line, signal)
//! histogram = line - signal
//! First valid histogram value at index slow + signal - 2.

use super::ema::ema;

#[derive(Debug, Clone, Copy)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Macd {
    /// Bars needed before the histogram is defined.
    pub fn min_bars(&self) -> usize {
        self.slow.max(self.fast) + self.signal - 1
    }

    /// Histogram series (the "difference" line), same length as `closes`.
    pub fn histogram(&self, closes: &[f64]) -> Vec<f64> {
        let fast = ema(closes, self.fast);
        let slow = ema(closes, self.slow);

        let line: Vec<f64> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| f - s)
            .collect();
        let signal = ema(&line, self.signal);

        line.iter().zip(&signal).map(|(l, s)| l - s).collect()
    }
}

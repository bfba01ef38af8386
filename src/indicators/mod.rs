//! Technical indicators over a bar history.
//!
//! Every series function returns a `Vec<f64>` the same length as its input,
//! with NaN during warmup. No value at bar t reads data after bar t.

mod adx;
mod ema;
mod macd;
mod rsi;
mod volume;

pub use adx::adx;
pub use ema::ema;
pub use macd::Macd;
pub use rsi::rsi;
pub use volume::is_volume_spike;

/// Last value of a series, NaN if empty.
pub fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

#[cfg(test)]
pub(crate) fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::models::Bar> {
    use chrono::{TimeZone, Utc};

    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::models::Bar {
            time: Utc.timestamp_opt(1_700_000_000 + i as i64 * 900, 0).unwrap(),
            open,
            high,
            low,
            close,
            tick_volume: 100,
            spread: 0,
            real_volume: 0.0,
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<crate::models::Bar> {
    let data: Vec<_> = closes.iter().map(|&c| (c, c, c, c)).collect();
    make_ohlc_bars(&data)
}

#[cfg(test)]
pub(crate) fn make_volume_bars(volumes: &[f64]) -> Vec<crate::models::Bar> {
    let mut bars = make_bars(&vec![1.0; volumes.len()]);
    for (bar, &v) in bars.iter_mut().zip(volumes) {
        bar.real_volume = v;
    }
    bars
}

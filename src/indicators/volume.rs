//! Real-volume spike detection.

use statrs::statistics::Statistics;

use crate::models::Bar;

/// Mean real volume of the last `window` bars, the latest bar included.
/// NaN when the series is empty.
pub fn trailing_volume_mean(bars: &[Bar], window: usize) -> f64 {
    let start = bars.len().saturating_sub(window);
    let volumes: Vec<f64> = bars[start..].iter().map(|b| b.real_volume).collect();
    volumes.iter().mean()
}

/// True if the latest bar trades more than `multiple` times the trailing mean.
pub fn is_volume_spike(bars: &[Bar], window: usize, multiple: f64) -> bool {
    let Some(last) = bars.last() else {
        return false;
    };
    let mean = trailing_volume_mean(bars, window);
    last.real_volume > multiple * mean
}

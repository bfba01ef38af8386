//! Exponentially weighted moving averages.
//!
//! Recursive: y[t] = alpha * x[t] + (1 - alpha) * y[t-1]
//! Seed: y[start] = x[start], where `start` is the first non-NaN input.
//! Values are reported once `min_periods` inputs have been seen; earlier
//! positions are NaN.

/// Exponentially weighted mean with an explicit smoothing factor.
///
/// Leading NaNs are skipped so that a derived series (e.g. the MACD line)
/// can be smoothed again. A NaN after the seed taints the rest of the output.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let mut prev = values[start];
    for (seen, i) in (start..n).enumerate() {
        let v = values[i];
        if v.is_nan() {
            return result;
        }
        if seen > 0 {
            prev = alpha * v + (1.0 - alpha) * prev;
        }
        if seen + 1 >= min_periods {
            result[i] = prev;
        }
    }

    result
}

/// EMA with span `period` (alpha = 2 / (period + 1)).
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    ewm(values, alpha, period)
}

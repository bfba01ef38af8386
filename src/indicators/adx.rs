//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM, -DM and true range from consecutive bars
//! 2. Smooth each with Wilder smoothing (seed = mean of the first `period`)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! First valid value at index 2 * period - 1.

use crate::models::Bar;

pub fn adx(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    if n < 2 || period == 0 {
        return vec![f64::NAN; n];
    }

    let mut tr = vec![f64::NAN; n];
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let (cur, prev) = (&bars[i], &bars[i - 1]);

        tr[i] = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up = cur.high - prev.high;
        let down = prev.low - cur.low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        if smooth_tr[i] == 0.0 {
            dx[i] = 0.0;
            continue;
        }

        let plus_di = 100.0 * smooth_plus[i] / smooth_tr[i];
        let minus_di = 100.0 * smooth_minus[i] / smooth_tr[i];
        let di_sum = plus_di + minus_di;

        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
    }

    wilder_smooth(&dx, period)
}

/// Wilder smoothing, alpha = 1/period.
/// Seed: mean of the first `period` values after any leading NaNs.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + period;
    if period == 0 || seed_end > n {
        return result;
    }

    let window = &values[start..seed_end];
    if window.iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut prev = window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

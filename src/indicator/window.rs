//! Series primitives shared by the indicator groups.
//!
//! Every series has one slot per bar. `None` marks a value that cannot be
//! computed, either because the window is not yet full or because an input
//! bar was unusable.

pub type Series = Vec<Option<f64>>;

/// Keep only finite results; division by zero and overflow become absent.
pub fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// Apply `f` to every full trailing window (inclusive of the current bar).
///
/// A window containing any missing value produces `None`.
pub fn rolling(values: &[Option<f64>], window: usize, f: impl Fn(&[f64]) -> f64) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            out[i] = finite(f(&buf));
        }
    }
    out
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Series {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Series {
    rolling(values, window, |w| w.iter().sum())
}

pub fn rolling_max(values: &[Option<f64>], window: usize) -> Series {
    rolling(values, window, |w| w.iter().copied().fold(f64::MIN, f64::max))
}

pub fn rolling_min(values: &[Option<f64>], window: usize) -> Series {
    rolling(values, window, |w| w.iter().copied().fold(f64::MAX, f64::min))
}

/// Population standard deviation (divides by `n`).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Series {
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        (w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
    })
}

/// Exponential smoothing with factor `alpha`, seeded with the simple average
/// of the first `period` values.
///
/// A missing value resets the state; the next `period` usable values form a
/// fresh seed.
pub fn smooth(values: &[Option<f64>], period: usize, alpha: f64) -> Series {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let mut run = 0usize;
    let mut seed_sum = 0.0;
    let mut prev: Option<f64> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(x) = *value else {
            run = 0;
            seed_sum = 0.0;
            prev = None;
            continue;
        };
        let next = match prev {
            Some(p) => Some(x * alpha + p * (1.0 - alpha)),
            None => {
                run += 1;
                seed_sum += x;
                (run == period).then(|| seed_sum / period as f64)
            }
        };
        if let Some(v) = next {
            prev = Some(v);
            out[i] = finite(v);
        }
    }
    out
}

/// Wilder's smoothing (`alpha = 1 / period`), used by RSI, ATR and ADX.
pub fn wilder(values: &[Option<f64>], period: usize) -> Series {
    smooth(values, period, 1.0 / period as f64)
}

/// `(current / value `periods` bars ago - 1) * 100`.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Series {
    (0..values.len())
        .map(|i| {
            let current = values[i]?;
            let previous = values[i.checked_sub(periods)?]?;
            if previous == 0.0 {
                return None;
            }
            finite((current / previous - 1.0) * 100.0)
        })
        .collect()
}

pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Midpoint of the trailing high/low extremes (Ichimoku lines).
pub fn midpoint(highs: &[Option<f64>], lows: &[Option<f64>], window: usize) -> Series {
    zip_with(
        &rolling_max(highs, window),
        &rolling_min(lows, window),
        |h, l| (h + l) / 2.0,
    )
}

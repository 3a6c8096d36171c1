use crate::indicator::ma::ema;
use crate::indicator::window::{Series, zip_with};

pub const FAST: usize = 12;
pub const SLOW: usize = 26;
pub const SIGNAL: usize = 9;

pub struct MacdLines {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// MACD line (fast EMA - slow EMA), its EMA signal line and the histogram
/// `macd - signal`, all aligned to the input.
pub fn macd(closes: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let macd = zip_with(&ema(closes, fast), &ema(closes, slow), |f, s| f - s);
    let signal = ema(&macd, signal);
    let histogram = zip_with(&macd, &signal, |m, s| m - s);
    MacdLines {
        macd,
        signal,
        histogram,
    }
}

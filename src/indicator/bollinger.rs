use crate::indicator::ma::sma;
use crate::indicator::window::{Series, rolling_std, zip_with};

pub const PERIOD: usize = 20;
pub const STD_DEV_MULTIPLIER: f64 = 2.0;

pub struct Bands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
    /// `(upper - lower) / middle * 100`
    pub width: Series,
}

/// Bollinger Bands around the SMA using the population standard deviation.
pub fn bands(closes: &[Option<f64>], period: usize, std_dev_multiplier: f64) -> Bands {
    let middle = sma(closes, period);
    let std_dev = rolling_std(closes, period);
    let upper = zip_with(&middle, &std_dev, |m, sd| m + std_dev_multiplier * sd);
    let lower = zip_with(&middle, &std_dev, |m, sd| m - std_dev_multiplier * sd);
    let spread = zip_with(&upper, &lower, |u, l| u - l);
    let width = zip_with(&spread, &middle, |s, m| s / m * 100.0);
    Bands {
        upper,
        middle,
        lower,
        width,
    }
}

/// Where a close sits relative to its bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Above,
    Within,
    Below,
}

impl BandPosition {
    /// Without both bands the position reads as within.
    pub fn classify(close: f64, upper: Option<f64>, lower: Option<f64>) -> Self {
        match (upper, lower) {
            (Some(upper), Some(_)) if close > upper => Self::Above,
            (Some(_), Some(lower)) if close < lower => Self::Below,
            _ => Self::Within,
        }
    }
}

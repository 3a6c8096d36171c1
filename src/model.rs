use std::fmt;

use chrono::{DateTime, Utc};
use error_stack::{Report, bail};

use crate::error::MarketDataError;

/// Bar interval of the series. The brief's hour/day/week windows are
/// counted in 15-minute bars, so no other interval is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Min15,
}

impl TimeFrame {
    /// Parse a config-format string into a `TimeFrame`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "15m" => Some(Self::Min15),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min15 => "15m",
        }
    }

    /// Return the Yahoo chart API interval string for this timeframe.
    pub fn yahoo_interval(self) -> &'static str {
        match self {
            Self::Min15 => "15m",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLCV sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Whether the bar satisfies `high >= max(open, close) >= min(open, close) >= low >= 0`
    /// with finite, positive prices and a finite, non-negative volume.
    ///
    /// Unusable bars are kept in the series; indicators treat them as missing input.
    pub fn is_usable(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return false;
        }
        self.high >= self.open.max(self.close) && self.open.min(self.close) >= self.low
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Non-empty, strictly ascending series of bars for one symbol.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    timeframe: TimeFrame,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: TimeFrame,
        bars: Vec<Bar>,
    ) -> Result<Self, Report<MarketDataError>> {
        let symbol = symbol.into();
        if bars.is_empty() {
            bail!(MarketDataError::Unavailable { symbol });
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            bail!(MarketDataError::InvalidSeries {
                reason: format!(
                    "timestamps not strictly increasing: {} followed by {}",
                    pair[0].timestamp, pair[1].timestamp
                ),
            });
        }
        Ok(Self {
            symbol,
            timeframe,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn last(&self) -> &Bar {
        // The constructor rejects empty series.
        &self.bars[self.bars.len() - 1]
    }

    /// The last `n` bars, clamped to `1..=len`.
    pub fn tail(&self, n: usize) -> &[Bar] {
        let n = n.clamp(1, self.bars.len());
        &self.bars[self.bars.len() - n..]
    }

    /// Extract one field per bar; unusable bars map to `None`.
    pub fn field(&self, f: impl Fn(&Bar) -> f64) -> Vec<Option<f64>> {
        self.bars
            .iter()
            .map(|b| b.is_usable().then(|| f(b)))
            .collect()
    }

    pub fn closes(&self) -> Vec<Option<f64>> {
        self.field(|b| b.close)
    }

    pub fn highs(&self) -> Vec<Option<f64>> {
        self.field(|b| b.high)
    }

    pub fn lows(&self) -> Vec<Option<f64>> {
        self.field(|b| b.low)
    }

    pub fn volumes(&self) -> Vec<Option<f64>> {
        self.field(|b| b.volume)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone};

    use super::*;

    pub fn bar_at(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 3, 7, 0, 0).unwrap()
                + Duration::minutes(15 * i as i64),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Flat-range bars around each close: high = close + 1, low = close - 1.
    pub fn series_from_closes(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar_at(i, c, c + 1.0, c - 1.0, c, 1_000.0 + i as f64))
            .collect();
        BarSeries::new("TEST", TimeFrame::Min15, bars).unwrap()
    }

    /// A deterministic zig-zag uptrend with varying volume.
    pub fn wavy_series(n: usize) -> BarSeries {
        let bars = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1 + ((i % 7) as f64 - 3.0) * 0.4;
                let open = base - 0.2;
                let close = base + if i % 3 == 0 { -0.3 } else { 0.25 };
                let high = open.max(close) + 0.5;
                let low = open.min(close) - 0.5;
                bar_at(i, open, high, low, close, 10_000.0 + ((i * 37) % 11) as f64 * 500.0)
            })
            .collect();
        BarSeries::new("TEST", TimeFrame::Min15, bars).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn only_fifteen_minute_bars_parse() {
        assert_eq!(TimeFrame::from_str("15m"), Some(TimeFrame::Min15));
        assert_eq!(TimeFrame::Min15.to_string(), "15m");
        assert_eq!(TimeFrame::Min15.yahoo_interval(), "15m");
        for other in ["1m", "5m", "30m", "1h", "1d", "2m"] {
            assert_eq!(TimeFrame::from_str(other), None, "{other}");
        }
    }

    #[test]
    fn empty_series_is_unavailable() {
        let err = BarSeries::new("THYAO", TimeFrame::Min15, vec![]).unwrap_err();
        assert!(matches!(
            err.current_context(),
            MarketDataError::Unavailable { .. }
        ));
    }

    #[test]
    fn duplicate_timestamps_rejected() {
        let a = bar_at(0, 10.0, 11.0, 9.0, 10.0, 1.0);
        let b = bar_at(0, 10.0, 11.0, 9.0, 10.5, 1.0);
        assert!(BarSeries::new("THYAO", TimeFrame::Min15, vec![a, b]).is_err());
    }

    #[test]
    fn descending_timestamps_rejected() {
        let a = bar_at(1, 10.0, 11.0, 9.0, 10.0, 1.0);
        let b = bar_at(0, 10.0, 11.0, 9.0, 10.5, 1.0);
        assert!(BarSeries::new("THYAO", TimeFrame::Min15, vec![a, b]).is_err());
    }

    #[test]
    fn invariant_violations_make_bar_unusable() {
        assert!(bar_at(0, 10.0, 11.0, 9.0, 10.5, 0.0).is_usable());
        // high below close
        assert!(!bar_at(0, 10.0, 10.2, 9.0, 10.5, 1.0).is_usable());
        // low above open
        assert!(!bar_at(0, 10.0, 11.0, 10.1, 10.5, 1.0).is_usable());
        assert!(!bar_at(0, f64::NAN, 11.0, 9.0, 10.5, 1.0).is_usable());
        assert!(!bar_at(0, 10.0, 11.0, 9.0, 10.5, -1.0).is_usable());
        assert!(!bar_at(0, 0.0, 11.0, 0.0, 10.5, 1.0).is_usable());
    }

    #[test]
    fn unusable_bars_become_missing_fields() {
        let bars = vec![
            bar_at(0, 10.0, 11.0, 9.0, 10.5, 5.0),
            bar_at(1, 10.0, 9.0, 11.0, 10.5, 5.0),
        ];
        let series = BarSeries::new("THYAO", TimeFrame::Min15, bars).unwrap();
        assert_eq!(series.closes(), vec![Some(10.5), None]);
        assert_eq!(series.volumes(), vec![Some(5.0), None]);
    }

    #[test]
    fn tail_is_clamped() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert_eq!(series.tail(224).len(), 3);
        assert_eq!(series.tail(2)[0].close, 2.0);
        assert_eq!(series.tail(0).len(), 1);
    }
}

use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::rsi::{FAST_PERIOD, SLOW_PERIOD, rsi};
use crate::indicator::window::{Series, rolling_max, rolling_mean, rolling_min};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

pub const LOOKBACK: usize = 14;
pub const STOCH_SMOOTHING: usize = 3;

/// Position of the close inside the trailing high/low range, `0..=1`.
///
/// Absent when the range is flat.
fn range_position(closes: &[Option<f64>], highs: &[Option<f64>], lows: &[Option<f64>]) -> Series {
    let hh = rolling_max(highs, LOOKBACK);
    let ll = rolling_min(lows, LOOKBACK);
    (0..closes.len())
        .map(|i| {
            let (c, h, l) = (closes[i]?, hh[i]?, ll[i]?);
            if h == l {
                return None;
            }
            Some((c - l) / (h - l))
        })
        .collect()
}

/// RSI(14), RSI(6), Williams %R(14) and Stochastic %K(14) / %D(3).
pub struct Momentum;

impl IndicatorGroup for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::Rsi14,
            Column::Rsi6,
            Column::WilliamsR,
            Column::StochK,
            Column::StochD,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let closes = series.closes();
        let position = range_position(&closes, &series.highs(), &series.lows());

        // Williams %R on [-100, 0], Stochastic %K on [0, 100].
        let williams_r: Series = position.iter().map(|p| p.map(|p| (p - 1.0) * 100.0)).collect();
        let stoch_k: Series = position.iter().map(|p| p.map(|p| p * 100.0)).collect();
        let stoch_d = rolling_mean(&stoch_k, STOCH_SMOOTHING);

        Ok(GroupOutput::new()
            .with(Column::Rsi14, rsi(&closes, SLOW_PERIOD))
            .with(Column::Rsi6, rsi(&closes, FAST_PERIOD))
            .with(Column::WilliamsR, williams_r)
            .with(Column::StochK, stoch_k)
            .with(Column::StochD, stoch_d))
    }
}

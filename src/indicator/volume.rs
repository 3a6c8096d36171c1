use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::window::{Series, rolling_mean, rolling_sum, zip_with};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

pub const PERIOD: usize = 20;

/// On-Balance Volume.
///
/// Starts at the first usable bar's volume; subsequent volume is subtracted
/// on a strictly lower close and added otherwise. Unusable bars are skipped.
pub fn obv(series: &BarSeries) -> Series {
    let mut total: Option<f64> = None;
    let mut prev_close: Option<f64> = None;
    series
        .bars()
        .iter()
        .map(|bar| {
            if !bar.is_usable() {
                return None;
            }
            let signed = match prev_close {
                Some(prev) if bar.close < prev => -bar.volume,
                _ => bar.volume,
            };
            prev_close = Some(bar.close);
            let next = total.unwrap_or(0.0) + signed;
            total = Some(next);
            Some(next)
        })
        .collect()
}

/// Chaikin Money Flow.
///
/// The money-flow multiplier of a bar with `high == low` is zero.
pub fn cmf(series: &BarSeries, period: usize) -> Series {
    let flow_volume = series.field(|b| {
        let range = b.high - b.low;
        let multiplier = if range == 0.0 {
            0.0
        } else {
            ((b.close - b.low) - (b.high - b.close)) / range
        };
        multiplier * b.volume
    });
    zip_with(
        &rolling_sum(&flow_volume, period),
        &rolling_sum(&series.volumes(), period),
        |flow, volume| flow / volume,
    )
}

/// Volume SMA(20), OBV and CMF(20).
pub struct Volume;

impl IndicatorGroup for Volume {
    fn name(&self) -> &'static str {
        "volume"
    }

    fn columns(&self) -> &'static [Column] {
        &[Column::VolumeSma, Column::Obv, Column::Cmf]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        Ok(GroupOutput::new()
            .with(Column::VolumeSma, rolling_mean(&series.volumes(), PERIOD))
            .with(Column::Obv, obv(series))
            .with(Column::Cmf, cmf(series, PERIOD)))
    }
}

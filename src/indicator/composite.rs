use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::window::{Series, finite};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

/// Cumulative VWAP from the first bar of the series; never reset per day.
pub fn vwap(series: &BarSeries) -> Series {
    let mut price_volume = 0.0;
    let mut volume = 0.0;
    series
        .bars()
        .iter()
        .map(|bar| {
            if !bar.is_usable() {
                return None;
            }
            price_volume += bar.typical_price() * bar.volume;
            volume += bar.volume;
            finite(price_volume / volume)
        })
        .collect()
}

/// Typical price and cumulative VWAP.
pub struct PriceVolume;

impl IndicatorGroup for PriceVolume {
    fn name(&self) -> &'static str {
        "price_volume"
    }

    fn columns(&self) -> &'static [Column] {
        &[Column::TypicalPrice, Column::Vwap]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        Ok(GroupOutput::new()
            .with(Column::TypicalPrice, series.field(|b| b.typical_price()))
            .with(Column::Vwap, vwap(series)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeFrame;
    use crate::model::fixtures::bar_at;

    #[test]
    fn vwap_weights_by_volume() {
        let bars = vec![
            // typical price 10
            bar_at(0, 10.0, 11.0, 9.0, 10.0, 100.0),
            // typical price 20
            bar_at(1, 20.0, 21.0, 19.0, 20.0, 300.0),
        ];
        let series = BarSeries::new("T", TimeFrame::Min15, bars).unwrap();
        let values = vwap(&series);
        assert_eq!(values[0], Some(10.0));
        assert!((values[1].unwrap() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn vwap_without_volume_is_absent_until_volume_arrives() {
        let bars = vec![
            bar_at(0, 10.0, 11.0, 9.0, 10.0, 0.0),
            bar_at(1, 20.0, 21.0, 19.0, 20.0, 10.0),
        ];
        let series = BarSeries::new("T", TimeFrame::Min15, bars).unwrap();
        assert_eq!(vwap(&series), vec![None, Some(20.0)]);
    }

    #[test]
    fn typical_price_column() {
        let bars = vec![bar_at(0, 10.0, 12.0, 9.0, 11.0, 5.0)];
        let series = BarSeries::new("T", TimeFrame::Min15, bars).unwrap();
        let out = PriceVolume.compute(&series).unwrap().into_columns();
        assert_eq!(
            crate::indicator::column_of(&out, Column::TypicalPrice)[0],
            Some(32.0 / 3.0)
        );
    }
}

use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::window::{pct_change, rolling_max, rolling_min};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

/// Four 15-minute bars.
pub const HOUR_BARS: usize = 4;
/// Roughly one trading session of 15-minute bars.
pub const DAY_BARS: usize = 32;
pub const RANGE_BARS: usize = 48;

/// Hourly / daily price change, hourly volume change, and the 48-bar
/// resistance (highest high) and support (lowest low).
pub struct DerivedMomentum;

impl IndicatorGroup for DerivedMomentum {
    fn name(&self) -> &'static str {
        "derived_momentum"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::PriceChange1h,
            Column::PriceChange1d,
            Column::VolumeChange,
            Column::Resistance,
            Column::Support,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let closes = series.closes();
        Ok(GroupOutput::new()
            .with(Column::PriceChange1h, pct_change(&closes, HOUR_BARS))
            .with(Column::PriceChange1d, pct_change(&closes, DAY_BARS))
            .with(Column::VolumeChange, pct_change(&series.volumes(), HOUR_BARS))
            .with(Column::Resistance, rolling_max(&series.highs(), RANGE_BARS))
            .with(Column::Support, rolling_min(&series.lows(), RANGE_BARS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::column_of;
    use crate::model::fixtures::series_from_closes;

    #[test]
    fn hourly_change_compares_four_bars_back() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = DerivedMomentum
            .compute(&series_from_closes(&closes))
            .unwrap()
            .into_columns();
        let hourly = column_of(&out, Column::PriceChange1h);
        assert!(hourly[3].is_none());
        // 104 / 100
        assert!((hourly[4].unwrap() - 4.0).abs() < 1e-9);
        let daily = column_of(&out, Column::PriceChange1d);
        assert!(daily[31].is_none());
        assert!((daily[32].unwrap() - 32.0).abs() < 1e-9);
        assert!(column_of(&out, Column::Resistance).iter().all(Option::is_none));
    }

    #[test]
    fn support_and_resistance_span_forty_eight_bars() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let out = DerivedMomentum
            .compute(&series_from_closes(&closes))
            .unwrap()
            .into_columns();
        // bars 2..=49
        assert_eq!(column_of(&out, Column::Resistance)[49], Some(150.0));
        assert_eq!(column_of(&out, Column::Support)[49], Some(101.0));
        assert_eq!(column_of(&out, Column::Support)[47], Some(99.0));
    }
}

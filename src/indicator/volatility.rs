use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::bollinger::{PERIOD, STD_DEV_MULTIPLIER, bands};
use crate::indicator::ma::sma;
use crate::indicator::window::{Series, wilder};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

pub const ATR_PERIOD: usize = 14;
pub const KELTNER_PERIOD: usize = 20;

/// True range per bar.
///
/// The first bar has no previous close; with `first_bar_range` it reads as
/// `high - low`, otherwise it is absent. A bar after an unusable one is absent.
pub fn true_range(series: &BarSeries, first_bar_range: bool) -> Series {
    let bars = series.bars();
    (0..bars.len())
        .map(|i| {
            let bar = &bars[i];
            if !bar.is_usable() {
                return None;
            }
            let range = bar.high - bar.low;
            if i == 0 {
                return first_bar_range.then_some(range);
            }
            let prev = &bars[i - 1];
            if !prev.is_usable() {
                return None;
            }
            Some(
                range
                    .max((bar.high - prev.close).abs())
                    .max((bar.low - prev.close).abs()),
            )
        })
        .collect()
}

/// Bollinger Bands(20, 2), ATR(14) and the Keltner Channel(20).
pub struct Volatility;

impl IndicatorGroup for Volatility {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::BbUpper,
            Column::BbMiddle,
            Column::BbLower,
            Column::BbWidth,
            Column::Atr,
            Column::KcUpper,
            Column::KcLower,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let bb = bands(&series.closes(), PERIOD, STD_DEV_MULTIPLIER);
        let atr = wilder(&true_range(series, true), ATR_PERIOD);

        // Classic Keltner: bands are averages of skewed typical prices.
        let kc_upper = sma(
            &series.field(|b| (4.0 * b.high - 2.0 * b.low + b.close) / 3.0),
            KELTNER_PERIOD,
        );
        let kc_lower = sma(
            &series.field(|b| (-2.0 * b.high + 4.0 * b.low + b.close) / 3.0),
            KELTNER_PERIOD,
        );

        Ok(GroupOutput::new()
            .with(Column::BbUpper, bb.upper)
            .with(Column::BbMiddle, bb.middle)
            .with(Column::BbLower, bb.lower)
            .with(Column::BbWidth, bb.width)
            .with(Column::Atr, atr)
            .with(Column::KcUpper, kc_upper)
            .with(Column::KcLower, kc_lower))
    }
}

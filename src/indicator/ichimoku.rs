use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::window::{midpoint, zip_with};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

pub const CONVERSION: usize = 9;
pub const BASE: usize = 26;
pub const SPAN_B: usize = 52;

/// Ichimoku conversion / base lines and leading spans A and B, unshifted.
pub struct Ichimoku;

impl IndicatorGroup for Ichimoku {
    fn name(&self) -> &'static str {
        "ichimoku"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::IchimokuConversion,
            Column::IchimokuBase,
            Column::IchimokuA,
            Column::IchimokuB,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let highs = series.highs();
        let lows = series.lows();
        let conversion = midpoint(&highs, &lows, CONVERSION);
        let base = midpoint(&highs, &lows, BASE);
        let span_a = zip_with(&conversion, &base, |c, b| (c + b) / 2.0);
        let span_b = midpoint(&highs, &lows, SPAN_B);

        Ok(GroupOutput::new()
            .with(Column::IchimokuConversion, conversion)
            .with(Column::IchimokuBase, base)
            .with(Column::IchimokuA, span_a)
            .with(Column::IchimokuB, span_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::column_of;
    use crate::model::fixtures::series_from_closes;

    #[test]
    fn lines_on_linear_trend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let out = Ichimoku
            .compute(&series_from_closes(&closes))
            .unwrap()
            .into_columns();
        // bars 51..=59: high max 160, low min 150
        let conversion = column_of(&out, Column::IchimokuConversion)[59].unwrap();
        assert!((conversion - 155.0).abs() < 1e-9);
        // bars 34..=59: 160 and 133
        let base = column_of(&out, Column::IchimokuBase)[59].unwrap();
        assert!((base - 146.5).abs() < 1e-9);
        let a = column_of(&out, Column::IchimokuA)[59].unwrap();
        assert!((a - (conversion + base) / 2.0).abs() < 1e-9);
        // bars 8..=59: 160 and 107
        let b = column_of(&out, Column::IchimokuB)[59].unwrap();
        assert!((b - 133.5).abs() < 1e-9);
    }

    #[test]
    fn span_b_needs_fifty_two_bars() {
        let closes: Vec<f64> = (0..51).map(|i| 100.0 + i as f64).collect();
        let out = Ichimoku
            .compute(&series_from_closes(&closes))
            .unwrap()
            .into_columns();
        assert!(column_of(&out, Column::IchimokuB).iter().all(Option::is_none));
        assert!(column_of(&out, Column::IchimokuBase)[50].is_some());
    }
}

use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::window::{Series, rolling_mean, smooth};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

/// Simple moving average over a trailing window.
pub fn sma(prices: &[Option<f64>], period: usize) -> Series {
    rolling_mean(prices, period)
}

/// Exponential moving average, `k = 2 / (period + 1)`, seeded with the SMA of
/// the first `period` prices.
pub fn ema(prices: &[Option<f64>], period: usize) -> Series {
    smooth(prices, period, 2.0 / (period as f64 + 1.0))
}

const WINDOWS: [(usize, Column, Column); 4] = [
    (5, Column::Sma5, Column::Ema5),
    (10, Column::Sma10, Column::Ema10),
    (20, Column::Sma20, Column::Ema20),
    (50, Column::Sma50, Column::Ema50),
];

/// SMA and EMA of the close at 5, 10, 20 and 50 bars.
///
/// Each window is its own column; a short history leaves the long windows
/// absent without touching the short ones.
pub struct MovingAverages;

impl IndicatorGroup for MovingAverages {
    fn name(&self) -> &'static str {
        "moving_averages"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::Sma5,
            Column::Sma10,
            Column::Sma20,
            Column::Sma50,
            Column::Ema5,
            Column::Ema10,
            Column::Ema20,
            Column::Ema50,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let closes = series.closes();
        Ok(WINDOWS
            .iter()
            .fold(GroupOutput::new(), |out, &(period, sma_col, ema_col)| {
                out.with(sma_col, sma(&closes, period))
                    .with(ema_col, ema(&closes, period))
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::column_of;
    use crate::model::fixtures::series_from_closes;

    fn variance(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    fn present(series: &Series) -> Vec<f64> {
        series.iter().flatten().copied().collect()
    }

    #[test]
    fn sma_known_value() {
        let prices = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let values = sma(&prices, 3);
        // (1+2+3)/3 = 2.0, (2+3+4)/3 = 3.0
        assert_eq!(values, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn ema_seed_equals_sma() {
        let prices = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let values = ema(&prices, 3);
        assert_eq!(values[2], Some(2.0));
        // 4 * 0.5 + 2 * 0.5
        assert!((values[3].unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ema_flat_prices() {
        let prices = vec![Some(10.0); 8];
        for v in ema(&prices, 3).into_iter().flatten() {
            assert!((v - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn short_history_keeps_short_windows() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let out = MovingAverages
            .compute(&series_from_closes(&closes))
            .unwrap()
            .into_columns();
        let get = |col: Column| column_of(&out, col);
        assert!(get(Column::Sma50).iter().all(Option::is_none));
        assert!(get(Column::Ema50).iter().all(Option::is_none));
        assert!(get(Column::Sma5)[29].is_some());
        assert!(get(Column::Ema20)[29].is_some());
        assert!(get(Column::Sma20)[18].is_none());
        assert!(get(Column::Sma20)[19].is_some());
    }

    #[test]
    fn longer_windows_are_smoother_on_monotonic_input() {
        let closes: Vec<Option<f64>> = (0..200).map(|i| Some(20.0 + i as f64 * 0.5)).collect();
        let sma5 = present(&sma(&closes, 5));
        let sma50 = present(&sma(&closes, 50));
        assert!(variance(&sma50) <= variance(&sma5));

        let ema5 = present(&ema(&closes, 5));
        let ema50 = present(&ema(&closes, 50));
        assert!(variance(&ema50) <= variance(&ema5));
    }
}

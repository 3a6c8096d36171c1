use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::macd::{FAST, SIGNAL, SLOW, macd};
use crate::indicator::volatility::true_range;
use crate::indicator::window::{Series, rolling, wilder, zip_with};
use crate::indicator::{Column, GroupOutput, IndicatorGroup, ensure_usable};
use crate::model::BarSeries;

pub const ADX_PERIOD: usize = 14;
pub const CCI_PERIOD: usize = 20;
const CCI_CONSTANT: f64 = 0.015;

pub struct Directional {
    pub plus_di: Series,
    pub minus_di: Series,
    pub adx: Series,
}

/// Wilder's directional movement system.
pub fn directional(series: &BarSeries, period: usize) -> Directional {
    let highs = series.highs();
    let lows = series.lows();
    let n = highs.len();

    let mut plus_dm: Series = vec![None; n];
    let mut minus_dm: Series = vec![None; n];
    for i in 1..n {
        let (Some(h), Some(l), Some(ph), Some(pl)) = (highs[i], lows[i], highs[i - 1], lows[i - 1])
        else {
            continue;
        };
        let up = h - ph;
        let down = pl - l;
        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let tr = wilder(&true_range(series, false), period);
    let plus_di = zip_with(&wilder(&plus_dm, period), &tr, |dm, tr| 100.0 * dm / tr);
    let minus_di = zip_with(&wilder(&minus_dm, period), &tr, |dm, tr| 100.0 * dm / tr);
    let dx = zip_with(&plus_di, &minus_di, |p, m| 100.0 * (p - m).abs() / (p + m));
    let adx = wilder(&dx, period);

    Directional {
        plus_di,
        minus_di,
        adx,
    }
}

/// Commodity Channel Index on the typical price.
///
/// Absent where the mean absolute deviation is zero.
pub fn cci(series: &BarSeries, period: usize) -> Series {
    let typical = series.field(|b| b.typical_price());
    rolling(&typical, period, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let mad = w.iter().map(|x| (x - mean).abs()).sum::<f64>() / w.len() as f64;
        (w[w.len() - 1] - mean) / (CCI_CONSTANT * mad)
    })
}

/// MACD(12, 26, 9), ADX(14) with +DI / -DI, and CCI(20).
pub struct Trend;

impl IndicatorGroup for Trend {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn columns(&self) -> &'static [Column] {
        &[
            Column::Macd,
            Column::MacdSignal,
            Column::MacdHistogram,
            Column::Adx,
            Column::AdxPos,
            Column::AdxNeg,
            Column::Cci,
        ]
    }

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>> {
        ensure_usable(self.name(), series)?;
        let lines = macd(&series.closes(), FAST, SLOW, SIGNAL);
        let dmi = directional(series, ADX_PERIOD);

        Ok(GroupOutput::new()
            .with(Column::Macd, lines.macd)
            .with(Column::MacdSignal, lines.signal)
            .with(Column::MacdHistogram, lines.histogram)
            .with(Column::Adx, dmi.adx)
            .with(Column::AdxPos, dmi.plus_di)
            .with(Column::AdxNeg, dmi.minus_di)
            .with(Column::Cci, cci(series, CCI_PERIOD)))
    }
}

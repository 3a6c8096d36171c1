pub mod bollinger;
pub mod composite;
pub mod derived;
pub mod ichimoku;
pub mod ma;
pub mod macd;
pub mod momentum;
pub mod pipeline;
pub mod rsi;
pub mod trend;
pub mod volatility;
pub mod volume;
pub mod window;

use std::fmt;

use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::model::BarSeries;
use window::Series;

/// Every derived column the pipeline can attach to a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Rsi14,
    Rsi6,
    WilliamsR,
    StochK,
    StochD,
    Macd,
    MacdSignal,
    MacdHistogram,
    Adx,
    AdxPos,
    AdxNeg,
    Cci,
    Sma5,
    Sma10,
    Sma20,
    Sma50,
    Ema5,
    Ema10,
    Ema20,
    Ema50,
    BbUpper,
    BbMiddle,
    BbLower,
    BbWidth,
    Atr,
    KcUpper,
    KcLower,
    VolumeSma,
    Obv,
    Cmf,
    TypicalPrice,
    Vwap,
    IchimokuConversion,
    IchimokuBase,
    IchimokuA,
    IchimokuB,
    PriceChange1h,
    PriceChange1d,
    VolumeChange,
    Resistance,
    Support,
}

impl Column {
    pub const ALL: [Column; 41] = [
        Self::Rsi14,
        Self::Rsi6,
        Self::WilliamsR,
        Self::StochK,
        Self::StochD,
        Self::Macd,
        Self::MacdSignal,
        Self::MacdHistogram,
        Self::Adx,
        Self::AdxPos,
        Self::AdxNeg,
        Self::Cci,
        Self::Sma5,
        Self::Sma10,
        Self::Sma20,
        Self::Sma50,
        Self::Ema5,
        Self::Ema10,
        Self::Ema20,
        Self::Ema50,
        Self::BbUpper,
        Self::BbMiddle,
        Self::BbLower,
        Self::BbWidth,
        Self::Atr,
        Self::KcUpper,
        Self::KcLower,
        Self::VolumeSma,
        Self::Obv,
        Self::Cmf,
        Self::TypicalPrice,
        Self::Vwap,
        Self::IchimokuConversion,
        Self::IchimokuBase,
        Self::IchimokuA,
        Self::IchimokuB,
        Self::PriceChange1h,
        Self::PriceChange1d,
        Self::VolumeChange,
        Self::Resistance,
        Self::Support,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsi14 => "RSI",
            Self::Rsi6 => "RSI_6",
            Self::WilliamsR => "Williams_R",
            Self::StochK => "Stoch_K",
            Self::StochD => "Stoch_D",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_signal",
            Self::MacdHistogram => "MACD_histogram",
            Self::Adx => "ADX",
            Self::AdxPos => "ADX_pos",
            Self::AdxNeg => "ADX_neg",
            Self::Cci => "CCI",
            Self::Sma5 => "SMA_5",
            Self::Sma10 => "SMA_10",
            Self::Sma20 => "SMA_20",
            Self::Sma50 => "SMA_50",
            Self::Ema5 => "EMA_5",
            Self::Ema10 => "EMA_10",
            Self::Ema20 => "EMA_20",
            Self::Ema50 => "EMA_50",
            Self::BbUpper => "BB_upper",
            Self::BbMiddle => "BB_middle",
            Self::BbLower => "BB_lower",
            Self::BbWidth => "BB_width",
            Self::Atr => "ATR",
            Self::KcUpper => "KC_upper",
            Self::KcLower => "KC_lower",
            Self::VolumeSma => "Volume_SMA",
            Self::Obv => "OBV",
            Self::Cmf => "CMF",
            Self::TypicalPrice => "Typical_Price",
            Self::Vwap => "VWAP",
            Self::IchimokuConversion => "Ichimoku_conversion",
            Self::IchimokuBase => "Ichimoku_base",
            Self::IchimokuA => "Ichimoku_a",
            Self::IchimokuB => "Ichimoku_b",
            Self::PriceChange1h => "Price_Change_1h",
            Self::PriceChange1d => "Price_Change_1d",
            Self::VolumeChange => "Volume_Change",
            Self::Resistance => "Resistance",
            Self::Support => "Support",
        }
    }

    /// Number of bars needed before the first value can exist.
    pub fn warm_up(self) -> usize {
        match self {
            Self::Rsi14 => rsi::SLOW_PERIOD + 1,
            Self::Rsi6 => rsi::FAST_PERIOD + 1,
            Self::WilliamsR | Self::StochK => momentum::LOOKBACK,
            Self::StochD => momentum::LOOKBACK + momentum::STOCH_SMOOTHING - 1,
            Self::Macd => macd::SLOW,
            Self::MacdSignal | Self::MacdHistogram => macd::SLOW + macd::SIGNAL - 1,
            Self::Adx => 2 * trend::ADX_PERIOD,
            Self::AdxPos | Self::AdxNeg => trend::ADX_PERIOD + 1,
            Self::Cci => trend::CCI_PERIOD,
            Self::Sma5 | Self::Ema5 => 5,
            Self::Sma10 | Self::Ema10 => 10,
            Self::Sma20 | Self::Ema20 => 20,
            Self::Sma50 | Self::Ema50 => 50,
            Self::BbUpper | Self::BbMiddle | Self::BbLower | Self::BbWidth => bollinger::PERIOD,
            Self::Atr => volatility::ATR_PERIOD,
            Self::KcUpper | Self::KcLower => volatility::KELTNER_PERIOD,
            Self::VolumeSma | Self::Cmf => volume::PERIOD,
            Self::Obv | Self::TypicalPrice | Self::Vwap => 1,
            Self::IchimokuConversion => ichimoku::CONVERSION,
            Self::IchimokuBase | Self::IchimokuA => ichimoku::BASE,
            Self::IchimokuB => ichimoku::SPAN_B,
            Self::PriceChange1h | Self::VolumeChange => derived::HOUR_BARS + 1,
            Self::PriceChange1d => derived::DAY_BARS + 1,
            Self::Resistance | Self::Support => derived::RANGE_BARS,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns produced by one successful group computation.
#[derive(Debug, Default)]
pub struct GroupOutput {
    columns: Vec<(Column, Series)>,
}

impl GroupOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, series: Series) -> Self {
        self.columns.push((column, series));
        self
    }

    pub fn into_columns(self) -> Vec<(Column, Series)> {
        self.columns
    }
}

/// A family of indicators computed together and failing together.
///
/// Bars must be in ascending chronological order (oldest first), which
/// `BarSeries` guarantees.
pub trait IndicatorGroup: Send + Sync {
    fn name(&self) -> &'static str;

    /// Columns this group owns. On failure each of them is marked absent.
    fn columns(&self) -> &'static [Column];

    fn compute(&self, series: &BarSeries) -> Result<GroupOutput, Report<IndicatorError>>;
}

/// Groups refuse to run on a series without a single usable bar.
pub fn ensure_usable(group: &str, series: &BarSeries) -> Result<(), Report<IndicatorError>> {
    if !series.bars().iter().any(|b| b.is_usable()) {
        bail!(IndicatorError::Degenerate {
            group: group.to_owned(),
            reason: "no usable bars".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn column_of(columns: &[(Column, Series)], column: Column) -> &Series {
    &columns
        .iter()
        .find(|(c, _)| *c == column)
        .unwrap_or_else(|| panic!("column {column} missing"))
        .1
}

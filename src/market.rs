pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::MarketDataError;
use crate::model::{BarSeries, TimeFrame};

/// Source of historical bars for one instrument.
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch roughly `lookback_days` of `timeframe` bars for `symbol`.
    ///
    /// Fails with `MarketDataError::Unavailable` when no complete bar is returned.
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        lookback_days: u32,
    ) -> BoxFuture<'_, Result<BarSeries, Report<MarketDataError>>>;
}

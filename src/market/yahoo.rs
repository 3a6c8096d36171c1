use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::MarketDataError;
use crate::market::MarketDataSource;
use crate::model::{Bar, BarSeries, TimeFrame};

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const SOURCE: &str = "yahoo";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance v8 chart API. Tickers get the exchange suffix appended
/// (`THYAO` -> `THYAO.IS`).
pub struct YahooSource {
    client: reqwest::Client,
    symbol_suffix: String,
}

impl YahooSource {
    pub fn new(symbol_suffix: impl Into<String>) -> Result<Self, Report<MarketDataError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .change_context(MarketDataError::Request {
                source_name: SOURCE.into(),
            })?;
        Ok(Self {
            client,
            symbol_suffix: symbol_suffix.into(),
        })
    }
}

impl MarketDataSource for YahooSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        lookback_days: u32,
    ) -> BoxFuture<'_, Result<BarSeries, Report<MarketDataError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let url = format!("{CHART_BASE_URL}/{symbol}{}", self.symbol_suffix);
            let range = format!("{lookback_days}d");
            let params = [("range", range.as_str()), ("interval", timeframe.yahoo_interval())];
            debug!(url = %url, range = %range, "requesting chart");

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(MarketDataError::Request {
                    source_name: SOURCE.into(),
                })?;

            if !response.status().is_success() {
                return Err(Report::new(MarketDataError::Unavailable {
                    symbol: symbol.clone(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let body: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(MarketDataError::ResponseParse {
                        source_name: SOURCE.into(),
                    })?;

            let series = parse_chart(&symbol, timeframe, body)?;
            info!(
                symbol = %symbol,
                timeframe = %timeframe,
                bars = series.len(),
                "chart fetch complete"
            );
            Ok(series)
        })
    }
}

/// Turn a chart response into a bar series, dropping rows with any missing
/// field or a timestamp that does not advance.
fn parse_chart(
    symbol: &str,
    timeframe: TimeFrame,
    response: ChartResponse,
) -> Result<BarSeries, Report<MarketDataError>> {
    let unavailable = || MarketDataError::Unavailable {
        symbol: symbol.to_owned(),
    };

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        let mut report = Report::new(unavailable());
        if let Some(err) = response.chart.error {
            report = report.attach(format!("{}: {}", err.code, err.description));
        }
        return Err(report);
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Err(Report::new(unavailable()).attach("no quote data"));
    };

    let mut dropped = 0usize;
    let mut superseded = 0usize;
    let mut out_of_order = 0usize;
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let row = (
            DateTime::from_timestamp(ts, 0),
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        );
        let (Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row
        else {
            dropped += 1;
            continue;
        };
        let bar = Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        match bars.last().map(|last: &Bar| last.timestamp) {
            // a repeated live bar supersedes the earlier row
            Some(prev) if prev == timestamp => {
                bars.pop();
                bars.push(bar);
                superseded += 1;
            }
            Some(prev) if prev > timestamp => out_of_order += 1,
            _ => bars.push(bar),
        }
    }
    if dropped > 0 {
        debug!(symbol, dropped, "dropped incomplete chart rows");
    }
    if superseded + out_of_order > 0 {
        debug!(
            symbol,
            superseded, out_of_order, "dropped chart rows with non-increasing timestamps"
        );
    }

    BarSeries::new(symbol, timeframe, bars)
}

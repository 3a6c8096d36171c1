mod brief;
mod config;
mod error;
mod forecast;
mod indicator;
mod market;
mod model;
mod presenter;
mod provider;
mod session;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, Credentials, DEFAULT_CONFIG_PATH, MarketConfig};
use forecast::{ForecastOutcome, ProviderChain};
use indicator::pipeline::Pipeline;
use market::MarketDataSource;
use market::yahoo::YahooSource;
use presenter::Presenter;
use presenter::terminal::TerminalPresenter;

/// Exit status when every provider failed.
const NO_FORECAST_EXIT: u8 = 2;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("market data error")]
    MarketData,
    #[display("brief compilation error")]
    Brief,
}

#[derive(Parser)]
#[command(
    name = "borsa-brief",
    about = "Technical-indicator brief and forecast for a Borsa Istanbul stock"
)]
struct Cli {
    /// Path to the TOML configuration file [default: borsa-brief.toml, optional]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analyse even when the exchange is closed
    #[arg(long)]
    force: bool,

    /// Print the compiled brief instead of querying providers
    #[arg(long)]
    brief_only: bool,

    /// BIST ticker, e.g. THYAO
    symbol: String,
}

#[derive(Debug, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    MarketClosed,
    NoForecast,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(RunOutcome::NoForecast) => ExitCode::from(NO_FORECAST_EXIT),
        Ok(_) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome, Report<AppError>> {
    let config = match &cli.config {
        Some(path) => config::load(path),
        None => config::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    }
    .change_context(AppError::Config)?;

    init_tracing(&config);

    let symbol = normalize_symbol(&cli.symbol, &config.market.symbol_suffix).ok_or_else(|| {
        Report::new(AppError::Config).attach(format!("invalid symbol: {:?}", cli.symbol))
    })?;
    let credentials = Credentials::from_env();
    info!(symbol = %symbol, credentials = ?credentials, "starting analysis");

    let presenter = TerminalPresenter;
    let session = session::status(Utc::now());
    presenter.session(&session);
    if !session.is_open && !cli.force {
        info!(reason = %session.reason, "market closed, pass --force to analyse anyway");
        return Ok(RunOutcome::MarketClosed);
    }

    let source = YahooSource::new(config.market.symbol_suffix.as_str())
        .change_context(AppError::MarketData)?;
    let chain = ProviderChain::new(&config.providers, &credentials);
    info!(providers = ?chain.provider_names(), "provider chain ready");

    analyse(
        &source,
        &chain,
        &presenter,
        &symbol,
        &config.market,
        cli.brief_only,
    )
    .await
}

/// Fetch, enrich, compile and forecast one symbol.
async fn analyse(
    source: &dyn MarketDataSource,
    chain: &ProviderChain,
    presenter: &dyn Presenter,
    symbol: &str,
    market: &MarketConfig,
    brief_only: bool,
) -> Result<RunOutcome, Report<AppError>> {
    let series = source
        .fetch_bars(symbol, market.timeframe(), market.lookback_days)
        .await
        .change_context(AppError::MarketData)
        .attach_with(|| format!("source: {}, symbol: {symbol}", source.name()))?;

    let enriched = Pipeline::standard().run(&series);
    for failure in enriched.failures() {
        warn!(
            symbol,
            group = failure.group,
            error = ?failure.error,
            "indicator group failed, its columns are absent"
        );
    }
    info!(
        symbol,
        timeframe = %series.timeframe(),
        bars = enriched.len(),
        "indicators computed"
    );

    let brief = brief::compile(&enriched).change_context(AppError::Brief)?;
    if brief_only {
        presenter.brief(&brief);
        return Ok(RunOutcome::Completed);
    }

    let report = chain.ask(&brief).await;
    presenter.forecast(symbol, &report);
    Ok(match report.outcome {
        ForecastOutcome::Answered { .. } => RunOutcome::Completed,
        ForecastOutcome::NoForecast => RunOutcome::NoForecast,
    })
}

/// Upper-case the ticker and drop an explicitly typed exchange suffix.
fn normalize_symbol(raw: &str, suffix: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    let bare = upper
        .strip_suffix(&suffix.to_uppercase())
        .unwrap_or(&upper)
        .to_owned();
    (!bare.is_empty()).then_some(bare)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    // Logs go to stderr so stdout carries only the brief / forecast.
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

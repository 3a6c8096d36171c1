use std::path::Path;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::TimeFrame;

pub const DEFAULT_CONFIG_PATH: &str = "borsa-brief.toml";

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_symbol_suffix() -> String {
    ".IS".into()
}

fn default_interval() -> String {
    "15m".into()
}

fn default_lookback_days() -> u32 {
    26
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"borsa_brief=debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketConfig {
    /// Appended to the ticker to form the Yahoo symbol (`THYAO` -> `THYAO.IS`).
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol_suffix: default_symbol_suffix(),
            interval: default_interval(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl MarketConfig {
    /// Only meaningful after validation; falls back to 15 minutes otherwise.
    pub fn timeframe(&self) -> TimeFrame {
        TimeFrame::from_str(&self.interval).unwrap_or(TimeFrame::Min15)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Provider API keys, read once at start-up. Empty values count as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini: Option<String>,
    pub xai: Option<String>,
    pub groq: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            gemini: read("GEMINI_API_KEY"),
            xai: read("XAI_API_KEY"),
            groq: read("GROQ_API_KEY"),
        }
    }
}

// Keys never reach log output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini", &self.gemini.is_some())
            .field("xai", &self.xai.is_some())
            .field("groq", &self.groq.is_some())
            .finish()
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    if path.exists() {
        return load(path);
    }
    let config = AppConfig::default();
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(&config.general)?;
    validate_market(&config.market)?;
    validate_providers(&config.providers)?;
    Ok(())
}

fn validate_general(general: &GeneralConfig) -> Result<(), Report<ConfigError>> {
    if !matches!(general.log_format.as_str(), "text" | "json") {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "general.log_format \"{}\" must be \"text\" or \"json\"",
                general.log_format
            ),
        }));
    }
    Ok(())
}

fn validate_market(market: &MarketConfig) -> Result<(), Report<ConfigError>> {
    if TimeFrame::from_str(&market.interval).is_none() {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "market.interval \"{}\" is not supported, only \"15m\" bars are",
                market.interval
            ),
        }));
    }
    if market.lookback_days == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "market.lookback_days must be at least 1".into(),
        }));
    }
    Ok(())
}

fn validate_providers(providers: &ProvidersConfig) -> Result<(), Report<ConfigError>> {
    if providers.request_timeout_secs == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "providers.request_timeout_secs must be at least 1".into(),
        }));
    }
    Ok(())
}

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum MarketDataError {
    #[display("no usable market data for {symbol}")]
    Unavailable { symbol: String },
    #[display("request to {source_name} failed")]
    Request { source_name: String },
    #[display("failed to parse response from {source_name}")]
    ResponseParse { source_name: String },
    #[display("invalid bar series: {reason}")]
    InvalidSeries { reason: String },
}

/// Failure of a single indicator group. Never escapes the pipeline.
#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("group {group} did not produce column {column}")]
    MissingColumn { group: String, column: String },
    #[display("group {group} produced {actual} values for column {column}, expected {expected}")]
    LengthMismatch {
        group: String,
        column: String,
        expected: usize,
        actual: usize,
    },
    #[display("group {group} is numerically degenerate: {reason}")]
    Degenerate { group: String, reason: String },
}

#[derive(Debug, Display, Error)]
pub enum BriefError {
    #[display("latest record is unusable (bar at {timestamp})")]
    UnusableLatestRecord { timestamp: String },
}

/// Failure of one provider attempt. The chain treats every variant alike.
#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("credential for {provider} is missing")]
    CredentialMissing { provider: String },
    #[display("request to {provider} failed")]
    Transport { provider: String },
    #[display("{provider} returned status {status}")]
    BadStatus { provider: String, status: u16 },
    #[display("response from {provider} lacks the expected text")]
    MalformedResponse { provider: String },
}

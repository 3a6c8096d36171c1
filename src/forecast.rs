use derive_more::Display;
use tracing::{info, warn};

use crate::brief::Brief;
use crate::config::{Credentials, ProvidersConfig};
use crate::error::ProviderError;
use crate::provider::Provider;
use crate::provider::gemini::Gemini;
use crate::provider::groq::Groq;
use crate::provider::http::HttpProvider;
use crate::provider::xai::Xai;

/// Why one provider attempt did not produce a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FailureKind {
    #[display("missing credential")]
    MissingCredential,
    #[display("transport failure")]
    Transport,
    #[display("bad status {_0}")]
    BadStatus(u16),
    #[display("malformed response")]
    MalformedResponse,
}

impl From<&ProviderError> for FailureKind {
    fn from(error: &ProviderError) -> Self {
        match error {
            ProviderError::CredentialMissing { .. } => Self::MissingCredential,
            ProviderError::Transport { .. } => Self::Transport,
            ProviderError::BadStatus { status, .. } => Self::BadStatus(*status),
            ProviderError::MalformedResponse { .. } => Self::MalformedResponse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDiagnostic {
    pub provider: &'static str,
    pub failure: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastOutcome {
    Answered { provider: &'static str, text: String },
    /// Every provider failed.
    NoForecast,
}

/// Outcome plus one diagnostic per failed attempt, in attempt order.
#[derive(Debug)]
pub struct ChainReport {
    pub outcome: ForecastOutcome,
    pub diagnostics: Vec<ProviderDiagnostic>,
}

/// Providers tried strictly in order; the first non-empty answer wins.
pub struct ProviderChain {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderChain {
    /// Gemini, then xAI Grok, then Groq, sharing one HTTP client.
    pub fn new(config: &ProvidersConfig, credentials: &Credentials) -> Self {
        let client = reqwest::Client::new();
        let timeout = config.request_timeout();
        Self::with_providers(vec![
            Box::new(HttpProvider::new(
                Gemini,
                credentials.gemini.clone(),
                client.clone(),
                timeout,
            )),
            Box::new(HttpProvider::new(
                Xai,
                credentials.xai.clone(),
                client.clone(),
                timeout,
            )),
            Box::new(HttpProvider::new(
                Groq,
                credentials.groq.clone(),
                client,
                timeout,
            )),
        ])
    }

    pub fn with_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Never errors: exhausting the chain is reported as [`ForecastOutcome::NoForecast`].
    pub async fn ask(&self, brief: &Brief) -> ChainReport {
        let mut diagnostics = Vec::new();

        for provider in &self.providers {
            let name = provider.name();
            info!(provider = name, symbol = brief.symbol(), "requesting forecast");
            match provider.query(brief.text()).await {
                Ok(text) if text.trim().is_empty() => {
                    warn!(provider = name, "provider returned empty text, trying next");
                    diagnostics.push(ProviderDiagnostic {
                        provider: name,
                        failure: FailureKind::MalformedResponse,
                    });
                }
                Ok(text) => {
                    info!(provider = name, chars = text.chars().count(), "forecast received");
                    return ChainReport {
                        outcome: ForecastOutcome::Answered {
                            provider: name,
                            text,
                        },
                        diagnostics,
                    };
                }
                Err(report) => {
                    warn!(provider = name, error = ?report, "provider failed, trying next");
                    diagnostics.push(ProviderDiagnostic {
                        provider: name,
                        failure: FailureKind::from(report.current_context()),
                    });
                }
            }
        }

        warn!(symbol = brief.symbol(), "all providers failed");
        ChainReport {
            outcome: ForecastOutcome::NoForecast,
            diagnostics,
        }
    }
}

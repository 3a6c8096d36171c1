pub mod gemini;
pub mod groq;
pub mod http;
pub mod xai;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;

/// A remote text-generation service that answers one prompt.
///
/// Uses `BoxFuture` so the chain can hold `Box<dyn Provider>`.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send the prompt and return the non-empty generated text.
    fn query(&self, prompt: &str) -> BoxFuture<'_, Result<String, Report<ProviderError>>>;
}

use std::time::Duration;

use error_stack::{Report, ResultExt, bail};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::Provider;

/// How the credential travels with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Appended as a query parameter with this name.
    QueryParam(&'static str),
    /// `Authorization: Bearer <key>`.
    Bearer,
}

/// Request encoding and response decoding for one provider's JSON API.
pub trait WireFormat: Send + Sync {
    fn name(&self) -> &'static str;
    fn endpoint(&self) -> &str;
    fn auth(&self) -> Auth;
    fn encode(&self, prompt: &str) -> Value;
    /// The generated text, if the body has the expected shape.
    fn decode(&self, body: &str) -> Option<String>;
}

/// A [`Provider`] that POSTs JSON through a shared `reqwest` client.
pub struct HttpProvider<W> {
    wire: W,
    credential: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl<W: WireFormat> HttpProvider<W> {
    pub fn new(
        wire: W,
        credential: Option<String>,
        client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            wire,
            credential,
            client,
            timeout,
        }
    }
}

impl<W: WireFormat> Provider for HttpProvider<W> {
    fn name(&self) -> &'static str {
        self.wire.name()
    }

    fn query(&self, prompt: &str) -> BoxFuture<'_, Result<String, Report<ProviderError>>> {
        let prompt = prompt.to_owned();
        Box::pin(async move {
            let provider = self.wire.name();
            let Some(key) = self.credential.as_deref().filter(|k| !k.is_empty()) else {
                bail!(ProviderError::CredentialMissing {
                    provider: provider.into(),
                });
            };

            let mut request = self
                .client
                .post(self.wire.endpoint())
                .timeout(self.timeout)
                .json(&self.wire.encode(&prompt));
            request = match self.wire.auth() {
                Auth::QueryParam(name) => request.query(&[(name, key)]),
                Auth::Bearer => request.bearer_auth(key),
            };

            // The URL may carry the key, so it is stripped from transport errors.
            let response = request
                .send()
                .await
                .map_err(reqwest::Error::without_url)
                .change_context(ProviderError::Transport {
                    provider: provider.into(),
                })?;

            let status = response.status();
            if !status.is_success() {
                bail!(ProviderError::BadStatus {
                    provider: provider.into(),
                    status: status.as_u16(),
                });
            }

            let body = response
                .text()
                .await
                .map_err(reqwest::Error::without_url)
                .change_context(ProviderError::Transport {
                    provider: provider.into(),
                })?;
            debug!(provider, bytes = body.len(), "provider response received");

            self.wire
                .decode(&body)
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| {
                    Report::new(ProviderError::MalformedResponse {
                        provider: provider.into(),
                    })
                })
        })
    }
}

/// OpenAI-style chat completion body shared by xAI and Groq.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// `choices[0].message.content`
pub fn chat_completion_text(body: &str) -> Option<String> {
    let completion: ChatCompletion = serde_json::from_str(body).ok()?;
    completion.choices.into_iter().next()?.message.content
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// Chat-completion wire format pointed at an arbitrary endpoint.
    struct Local {
        endpoint: String,
    }

    impl WireFormat for Local {
        fn name(&self) -> &'static str {
            "local"
        }

        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn auth(&self) -> Auth {
            Auth::Bearer
        }

        fn encode(&self, prompt: &str) -> Value {
            serde_json::json!({ "prompt": prompt })
        }

        fn decode(&self, body: &str) -> Option<String> {
            chat_completion_text(body)
        }
    }

    fn provider_at(endpoint: &str, credential: Option<&str>, timeout: Duration) -> HttpProvider<Local> {
        HttpProvider::new(
            Local {
                endpoint: endpoint.to_owned(),
            },
            credential.map(str::to_owned),
            reqwest::Client::new(),
            timeout,
        )
    }

    fn offline(credential: Option<&str>) -> HttpProvider<Local> {
        provider_at(
            "http://127.0.0.1:9/v1/chat/completions",
            credential,
            Duration::from_secs(2),
        )
    }

    /// Consume one full request (headers plus `content-length` body).
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let Ok(n) = stream.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }

    /// Serve a single canned response and return the endpoint URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    async fn query_canned(status: &'static str, body: &'static str) -> Result<String, Report<ProviderError>> {
        let endpoint = serve_once(status, body).await;
        provider_at(&endpoint, Some("key"), Duration::from_secs(5))
            .query("x")
            .await
    }

    #[test]
    fn chat_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"yükseliş"}},
                       {"message":{"content":"ignored"}}]}"#;
        assert_eq!(chat_completion_text(body).as_deref(), Some("yükseliş"));
    }

    #[test]
    fn chat_completion_missing_fields() {
        assert_eq!(chat_completion_text(r#"{"choices":[]}"#), None);
        assert_eq!(chat_completion_text(r#"{"error":"quota"}"#), None);
        assert_eq!(chat_completion_text(r#"{"choices":[{"message":{}}]}"#), None);
        assert_eq!(chat_completion_text("not json"), None);
    }

    #[tokio::test]
    async fn missing_credential_never_touches_the_network() {
        for credential in [None, Some("")] {
            let err = offline(credential).query("x").await.unwrap_err();
            assert!(matches!(
                err.current_context(),
                ProviderError::CredentialMissing { .. }
            ));
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let err = offline(Some("key")).query("x").await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::Transport { .. }
        ));
    }

    #[tokio::test]
    async fn successful_response_yields_text() {
        let text = query_canned(
            "200 OK",
            r#"{"choices":[{"message":{"content":"Beklenen Yön: Yatay"}}]}"#,
        )
        .await
        .unwrap();
        assert_eq!(text, "Beklenen Yön: Yatay");
    }

    #[tokio::test]
    async fn server_error_is_bad_status() {
        let err = query_canned("500 Internal Server Error", "")
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::BadStatus { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn body_without_choice_is_malformed() {
        let err = query_canned("200 OK", r#"{"choices":[]}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::MalformedResponse { .. }
        ));
    }

    #[tokio::test]
    async fn blank_text_is_malformed() {
        let err = query_canned("200 OK", r#"{"choices":[{"message":{"content":"  "}}]}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::MalformedResponse { .. }
        ));
    }

    #[tokio::test]
    async fn silent_server_hits_the_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let provider = provider_at(
            &format!("http://{addr}/v1/chat/completions"),
            Some("key"),
            Duration::from_millis(200),
        );
        let started = std::time::Instant::now();
        let err = provider.query("x").await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(
            err.current_context(),
            ProviderError::Transport { .. }
        ));
        server.abort();
    }
}

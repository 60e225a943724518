//! Language-model API interaction.
//!
//! This module provides the interface for communicating with an
//! OpenAI-compatible chat-completion endpoint.
//!
//! # Architecture
//!
//! - [`ChatCompletion`]: Core trait defining async LLM interaction
//! - [`CompletionOptions`]: Sampling parameters sent with every request
//! - [`OpenAiClient`]: HTTP implementation against `/chat/completions`
//!
//! There is no retry layer: any failure is returned to the caller as a
//! [`SummarizeError`] and aborts the page being summarized.

use crate::error::SummarizeError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Default model for summaries.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Sampling parameters for a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature; low values bias toward factual phrasing.
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 120,
            temperature: 0.2,
        }
    }
}

/// Trait for async LLM interaction.
///
/// Implementors send a single user prompt and return the text of the first
/// choice. This abstraction lets the summarizer run against the real HTTP
/// client or an in-process fake.
pub trait ChatCompletion {
    /// Send `prompt` as one user-role message and return the reply text.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Build a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatCompletion for OpenAiClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(%status, elapsed_ms = dt.as_millis(), "Completion request failed");
            return Err(SummarizeError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate_for_log(&body, 300), "Completion body did not parse");
            SummarizeError::Decode(e)
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(SummarizeError::NoChoices)?
            .message
            .content
            .unwrap_or_default();

        debug!(elapsed_ms = dt.as_millis(), reply_bytes = text.len(), "Completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> OpenAiClient {
        OpenAiClient::new(&server.url(), "test-key", DEFAULT_MODEL, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Summarise this"}],
                "max_tokens": 120,
                "temperature": 0.2
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  A short summary. "}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let reply = client_for(&server)
            .complete("Summarise this", &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, "  A short summary. ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url_is_ignored() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(
            &format!("{}/", server.url()),
            "k",
            DEFAULT_MODEL,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.complete("x", &CompletionOptions::default()).await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_a_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();

        match err {
            SummarizeError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::NoChoices));
    }

    #[tokio::test]
    async fn test_null_content_reads_as_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let reply = client_for(&server)
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_garbage_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Decode(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client =
            OpenAiClient::new(DEFAULT_BASE_URL, "sk-secret", DEFAULT_MODEL, Duration::from_secs(1))
                .unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("gpt-4o-mini"));
    }
}

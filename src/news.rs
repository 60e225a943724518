//! NewsAPI top-headlines client.
//!
//! One GET per page. The API key travels as the `apiKey` query parameter, so
//! request URLs are never logged.

use crate::error::FetchError;
use crate::models::{Article, HeadlineQuery, HeadlinesResponse};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use url::Url;

/// Top-headlines endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

/// Default request timeout for the news source.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of headline articles.
pub trait NewsSource {
    /// Fetch one page of headlines, in source order.
    async fn top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>, FetchError>;
}

/// HTTP client for the NewsAPI top-headlines endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl NewsApiClient {
    /// Build a client with a bounded per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(endpoint: Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    fn query_params(&self, query: &HeadlineQuery) -> [(&'static str, String); 4] {
        [
            ("country", query.country.as_str().to_string()),
            ("category", query.category.as_str().to_string()),
            ("pageSize", query.page_size.to_string()),
            ("apiKey", self.api_key.clone()),
        ]
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(country = %query.country, category = %query.category, page_size = query.page_size))]
    async fn top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if !status.is_success() {
            warn!(%status, body = %truncate_for_log(&body, 300), "News source returned an error status");
            return Err(FetchError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: HeadlinesResponse = serde_json::from_str(&body).map_err(FetchError::Decode)?;
        if parsed.status != "ok" {
            return Err(FetchError::Api {
                code: parsed.code.unwrap_or_else(|| parsed.status.clone()),
                message: parsed.message.unwrap_or_default(),
            });
        }

        info!(
            count = parsed.articles.len(),
            total_results = parsed.total_results,
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched headlines"
        );
        Ok(parsed.articles)
    }
}

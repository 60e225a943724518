//! Error types for each layer of the pipeline.
//!
//! Nothing here is recovered locally: a [`FetchError`] or [`SummarizeError`]
//! aborts the whole page fetch and surfaces to the caller as a
//! [`PipelineError`]. [`ConfigError`] is raised before any network call.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; add it to the environment or a .env file")]
    MissingSecret(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures talking to the news source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("news request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("news source returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("news source returned an undecodable body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("news source rejected the request ({code}): {message}")]
    Api { code: String, message: String },
}

/// Failures talking to the language-model service.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("completion endpoint returned an undecodable body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("completion response contained no choices")]
    NoChoices,
}

/// A failed page fetch. No partial results accompany it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("summarizing article {index} ({title:?}) failed: {source}")]
    Summarize {
        index: usize,
        title: String,
        #[source]
        source: SummarizeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_names_the_variable() {
        let e = ConfigError::MissingSecret("NEWS_API_KEY");
        assert!(e.to_string().starts_with("NEWS_API_KEY is not set"));
    }

    #[test]
    fn test_fetch_error_is_transparent_in_pipeline_error() {
        let e: PipelineError = FetchError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "news source returned HTTP 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn test_summarize_error_carries_article_position() {
        let e = PipelineError::Summarize {
            index: 3,
            title: "Storm".to_string(),
            source: SummarizeError::NoChoices,
        };
        let msg = e.to_string();
        assert!(msg.contains("article 3"));
        assert!(msg.contains("\"Storm\""));
        assert!(msg.contains("no choices"));
    }
}

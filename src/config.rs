//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! environment variables and CLI flags (see [`crate::cli::Cli`]). The two API
//! keys are required; a missing key stops the program before any request is
//! made.
//!
//! # Config file
//!
//! ```yaml
//! news_endpoint: https://newsapi.org/v2/top-headlines
//! news_timeout_secs: 10
//! llm_base_url: https://api.openai.com/v1
//! model: gpt-4o-mini
//! llm_timeout_secs: 60
//! max_tokens: 120
//! temperature: 0.2
//! word_limit: 60
//! cache_ttl_secs: 900
//! page_size: 20
//! ```
//!
//! Every key is optional.

use crate::api::{CompletionOptions, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::cache::DEFAULT_TTL;
use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::{DEFAULT_PAGE_SIZE, HeadlineQuery, MAX_PAGE_SIZE};
use crate::news::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::summary::WORD_LIMIT;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub news_endpoint: String,
    pub news_timeout_secs: u64,
    pub llm_base_url: String,
    pub model: String,
    pub llm_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    pub word_limit: usize,
    pub cache_ttl_secs: u64,
    pub page_size: u32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            news_endpoint: DEFAULT_ENDPOINT.to_string(),
            news_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            llm_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 60,
            max_tokens: CompletionOptions::default().max_tokens,
            temperature: CompletionOptions::default().temperature,
            word_limit: WORD_LIMIT,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FileConfig {
    /// Read and parse a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Fully resolved settings the program runs with.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub news_api_key: String,
    pub openai_api_key: String,
    pub news_endpoint: Url,
    pub news_timeout: Duration,
    pub llm_base_url: Url,
    pub model: String,
    pub llm_timeout: Duration,
    pub completion: CompletionOptions,
    pub word_limit: usize,
    pub cache_ttl: Duration,
    pub page_size: u32,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("news_endpoint", &self.news_endpoint.as_str())
            .field("llm_base_url", &self.llm_base_url.as_str())
            .field("model", &self.model)
            .field("word_limit", &self.word_limit)
            .field("cache_ttl", &self.cache_ttl)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Resolve settings from parsed CLI arguments (which already include the
    /// environment) and the config file they point at, if any.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::from_parts(
            file,
            cli.news_api_key.clone(),
            cli.openai_api_key.clone(),
            cli.model.clone(),
            cli.page_size,
        )
    }

    /// Combine a file config with the values that override it.
    pub fn from_parts(
        file: FileConfig,
        news_api_key: Option<String>,
        openai_api_key: Option<String>,
        model: Option<String>,
        page_size: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let news_api_key = require_secret(news_api_key, "NEWS_API_KEY")?;
        let openai_api_key = require_secret(openai_api_key, "OPENAI_API_KEY")?;

        let news_endpoint = parse_url("news_endpoint", &file.news_endpoint)?;
        let llm_base_url = parse_url("llm_base_url", &file.llm_base_url)?;

        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(file.model);
        if model.trim().is_empty() {
            return Err(invalid("model", "must not be empty"));
        }

        if file.news_timeout_secs == 0 {
            return Err(invalid("news_timeout_secs", "must be at least 1"));
        }
        if file.llm_timeout_secs == 0 {
            return Err(invalid("llm_timeout_secs", "must be at least 1"));
        }
        if file.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be at least 1"));
        }
        if file.word_limit == 0 {
            return Err(invalid("word_limit", "must be at least 1"));
        }
        if file.max_tokens == 0 {
            return Err(invalid("max_tokens", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&file.temperature) {
            return Err(invalid("temperature", "must be between 0 and 2"));
        }
        let page_size = page_size.unwrap_or(file.page_size);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(invalid(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        Ok(Self {
            news_api_key,
            openai_api_key,
            news_endpoint,
            news_timeout: Duration::from_secs(file.news_timeout_secs),
            llm_base_url,
            model,
            llm_timeout: Duration::from_secs(file.llm_timeout_secs),
            completion: CompletionOptions {
                max_tokens: file.max_tokens,
                temperature: file.temperature,
            },
            word_limit: file.word_limit,
            cache_ttl: Duration::from_secs(file.cache_ttl_secs),
            page_size,
        })
    }

    /// The query for `cli`'s filters at the configured page size.
    pub fn query(&self, cli: &Cli) -> HeadlineQuery {
        HeadlineQuery::new(cli.country, cli.category).with_page_size(self.page_size)
    }
}

fn require_secret(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingSecret(name))
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, "must be an http(s) URL"));
    }
    Ok(url)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn keys() -> (Option<String>, Option<String>) {
        (Some("news-key".to_string()), Some("llm-key".to_string()))
    }

    #[test]
    fn test_defaults() {
        let (n, o) = keys();
        let s = Settings::from_parts(FileConfig::default(), n, o, None, None).unwrap();

        assert_eq!(s.news_endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(s.news_timeout, Duration::from_secs(10));
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.completion, CompletionOptions { max_tokens: 120, temperature: 0.2 });
        assert_eq!(s.word_limit, 60);
        assert_eq!(s.cache_ttl, Duration::from_secs(900));
        assert_eq!(s.page_size, 20);
    }

    #[test]
    fn test_missing_news_key_is_fatal() {
        let err = Settings::from_parts(FileConfig::default(), None, Some("k".into()), None, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("NEWS_API_KEY")));
    }

    #[test]
    fn test_blank_llm_key_is_missing() {
        let err = Settings::from_parts(FileConfig::default(), Some("k".into()), Some("  ".into()), None, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("OPENAI_API_KEY")));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let file = FileConfig::from_yaml("model: gpt-4.1-mini\ncache_ttl_secs: 60\n").unwrap();
        assert_eq!(file.model, "gpt-4.1-mini");
        assert_eq!(file.cache_ttl_secs, 60);
        assert_eq!(file.word_limit, 60);
        assert_eq!(file.news_endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(FileConfig::from_yaml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_unknown_yaml_key_is_rejected() {
        assert!(FileConfig::from_yaml("modle: typo\n").is_err());
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = FileConfig {
            model: "from-file".to_string(),
            page_size: 10,
            ..FileConfig::default()
        };
        let (n, o) = keys();
        let s = Settings::from_parts(file, n, o, Some("from-env".to_string()), Some(5)).unwrap();
        assert_eq!(s.model, "from-env");
        assert_eq!(s.page_size, 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            FileConfig { cache_ttl_secs: 0, ..FileConfig::default() },
            FileConfig { word_limit: 0, ..FileConfig::default() },
            FileConfig { temperature: 3.5, ..FileConfig::default() },
            FileConfig { page_size: 0, ..FileConfig::default() },
            FileConfig { news_endpoint: "ftp://example.com".to_string(), ..FileConfig::default() },
            FileConfig { llm_base_url: "not a url".to_string(), ..FileConfig::default() },
        ];
        for file in cases {
            let (n, o) = keys();
            let result = Settings::from_parts(file.clone(), n, o, None, None);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "expected rejection for {file:?}"
            );
        }
    }

    #[test]
    fn test_resolve_reads_config_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "page_size: 7\nword_limit: 40").unwrap();
        let path = f.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "news_in_sixty",
            "--config",
            &path,
            "--news-api-key",
            "a",
            "--openai-api-key",
            "b",
            "--country",
            "au",
        ]);
        let s = Settings::resolve(&cli).unwrap();
        assert_eq!(s.page_size, 7);
        assert_eq!(s.word_limit, 40);

        let q = s.query(&cli);
        assert_eq!(q.page_size, 7);
        assert_eq!(q.country, crate::models::Country::Au);
    }

    #[test]
    fn test_resolve_missing_file() {
        let cli = Cli::parse_from([
            "news_in_sixty",
            "--config",
            "/definitely/not/here.yaml",
            "--news-api-key",
            "a",
            "--openai-api-key",
            "b",
        ]);
        assert!(matches!(Settings::resolve(&cli), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let (n, o) = keys();
        let s = Settings::from_parts(FileConfig::default(), n, o, None, None).unwrap();
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("news-key"));
        assert!(!dbg.contains("llm-key"));
    }
}

//! Data models for headline articles, queries, and summarized results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A headline record as returned by the news source
//! - [`HeadlineQuery`]: The filter tuple that also keys the result cache
//! - [`SummarizedArticle`]: An article paired with its generated [`Summary`]
//!
//! Wire names follow the NewsAPI JSON schema (camelCase), mapped onto
//! snake_case fields with `#[serde(rename)]`.

use crate::summary::Summary;
use chrono::{DateTime, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page the news source will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Countries the headline filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Us,
    Gb,
    In,
    Au,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Us => "us",
            Country::Gb => "gb",
            Country::In => "in",
            Country::Au => "au",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories the headline filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Technology,
    Sports,
    Science,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Science => "science",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page request against the news source.
///
/// Two queries with the same country, category, and page size are the same
/// cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadlineQuery {
    pub country: Country,
    pub category: Category,
    pub page_size: u32,
}

impl HeadlineQuery {
    pub fn new(country: Country, category: Category) -> Self {
        Self {
            country,
            category,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

impl fmt::Display for HeadlineQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({} per page)", self.country, self.category, self.page_size)
    }
}

/// The publisher block of an article.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A headline article as returned by the news source.
///
/// Every text field except the publisher name may be null upstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "urlToImage", default)]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// The raw HTML body: `content`, else `description`.
    ///
    /// Empty strings count as absent so a blank `content` still falls back.
    pub fn body_html(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.description.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    /// Whether the article can be shown and linked.
    ///
    /// Applied before summarization, so dropped articles cost no model call.
    pub fn is_displayable(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.title) && present(&self.url)
    }

    /// Publication date, parsed from the RFC 3339 timestamp.
    pub fn published_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

/// Envelope of the top-headlines endpoint.
#[derive(Debug, Deserialize)]
pub struct HeadlinesResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// An article paired with its generated summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizedArticle {
    pub article: Article,
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: Option<&str>, url: Option<&str>) -> Article {
        Article {
            title: title.map(str::to_string),
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_newsapi_article_with_nulls() {
        let json = r#"{
            "source": {"id": null, "name": "BBC News"},
            "author": null,
            "title": "Markets rally",
            "description": null,
            "url": "https://example.com/a",
            "urlToImage": null,
            "publishedAt": "2025-05-06T14:30:00Z",
            "content": null
        }"#;

        let a: Article = serde_json::from_str(json).unwrap();
        assert_eq!(a.source.name, "BBC News");
        assert_eq!(a.title.as_deref(), Some("Markets rally"));
        assert!(a.url_to_image.is_none());
        assert!(a.body_html().is_none());
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let a = Article {
            url_to_image: Some("https://example.com/i.jpg".to_string()),
            published_at: "2025-05-06T14:30:00Z".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"urlToImage\":\"https://example.com/i.jpg\""));
        assert!(json.contains("\"publishedAt\""));
    }

    #[test]
    fn test_body_falls_back_to_description() {
        let mut a = Article {
            description: Some("<p>desc</p>".to_string()),
            ..Default::default()
        };
        assert_eq!(a.body_html(), Some("<p>desc</p>"));

        a.content = Some(String::new());
        assert_eq!(a.body_html(), Some("<p>desc</p>"));

        a.content = Some("<b>body</b>".to_string());
        assert_eq!(a.body_html(), Some("<b>body</b>"));
    }

    #[test]
    fn test_is_displayable() {
        assert!(article(Some("T"), Some("https://x")).is_displayable());
        assert!(!article(None, Some("https://x")).is_displayable());
        assert!(!article(Some("T"), None).is_displayable());
        assert!(!article(Some("  "), Some("https://x")).is_displayable());
        assert!(!article(Some("T"), Some("")).is_displayable());
    }

    #[test]
    fn test_published_date() {
        let a = Article {
            published_at: "2025-05-06T23:30:00+00:00".to_string(),
            ..Default::default()
        };
        assert_eq!(a.published_date(), NaiveDate::from_ymd_opt(2025, 5, 6));

        let bad = Article {
            published_at: "yesterday".to_string(),
            ..Default::default()
        };
        assert_eq!(bad.published_date(), None);
    }

    #[test]
    fn test_query_page_size_is_clamped() {
        let q = HeadlineQuery::new(Country::Gb, Category::Technology);
        assert_eq!(q.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(q.with_page_size(0).page_size, 1);
        assert_eq!(q.with_page_size(500).page_size, MAX_PAGE_SIZE);
        assert_eq!(q.with_page_size(5).page_size, 5);
    }

    #[test]
    fn test_query_is_a_hash_key() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(HeadlineQuery::new(Country::Us, Category::General));
        set.insert(HeadlineQuery::new(Country::Us, Category::General));
        set.insert(HeadlineQuery::new(Country::Us, Category::General).with_page_size(5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(Country::In.to_string(), "in");
        assert_eq!(Category::Science.as_str(), "science");
        assert_eq!(Country::from_str("GB", true).unwrap(), Country::Gb);
        assert!(Category::from_str("weather", true).is_err());
    }
}

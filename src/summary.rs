//! Bounded-length summary generation.
//!
//! [`Summarizer`] wraps a [`ChatCompletion`] backend with the fixed
//! summarization prompt and enforces the word limit on whatever the model
//! returns. Nothing is short-circuited: an empty article body is still sent.

use crate::api::{ChatCompletion, CompletionOptions};
use crate::error::SummarizeError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{instrument, warn};

/// Maximum words kept from a model reply.
pub const WORD_LIMIT: usize = 60;

/// Appended (without a space) when a reply was cut to the word limit.
pub const ELLIPSIS: char = '…';

/// Replies that answer the prompt instead of summarizing an article.
static REFUSAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(please provide( me with)? the (news|article)|no (article|news)( text| content)? (was |has been )?provided|i('m| am) (sorry|unable)|there is no (article|content))",
    )
    .unwrap()
});

/// A generated summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
    /// The model reply exceeded the word limit and was cut.
    pub truncated: bool,
    /// The reply looks like a refusal rather than a summary.
    pub degraded: bool,
}

/// Build the instruction prompt for one article body.
pub fn build_prompt(text: &str, word_limit: usize) -> String {
    format!(
        "Summarise the following news article in ≤ {word_limit} words. \
         Keep it strictly factual; do not add opinions or extra details.\n\n{text}"
    )
}

/// Trim `reply` and keep at most `word_limit` whitespace-separated words.
///
/// Returns the joined words and whether anything was dropped. When words were
/// dropped the result ends in [`ELLIPSIS`].
pub fn truncate_words(reply: &str, word_limit: usize) -> (String, bool) {
    let words: Vec<&str> = reply.split_whitespace().collect();
    let truncated = words.len() > word_limit;
    let mut text = words.iter().take(word_limit).join(" ");
    if truncated {
        text.push(ELLIPSIS);
    }
    (text, truncated)
}

/// Whether `text` reads like a refusal or a request for input.
pub fn looks_like_refusal(text: &str) -> bool {
    REFUSAL.is_match(text)
}

/// Summarizes plain-text article bodies through a completion backend.
#[derive(Debug)]
pub struct Summarizer<C> {
    backend: C,
    options: CompletionOptions,
    word_limit: usize,
}

impl<C: ChatCompletion> Summarizer<C> {
    pub fn new(backend: C) -> Self {
        Self {
            backend,
            options: CompletionOptions::default(),
            word_limit: WORD_LIMIT,
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the word limit; values below one are raised to one.
    pub fn with_word_limit(mut self, word_limit: usize) -> Self {
        self.word_limit = word_limit.max(1);
        self
    }

    #[cfg(test)]
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Summarize one plain-text body.
    ///
    /// # Errors
    ///
    /// Any backend failure is returned unchanged.
    #[instrument(level = "debug", skip_all, fields(input_words = text.split_whitespace().count()))]
    pub async fn summarize(&self, text: &str) -> Result<Summary, SummarizeError> {
        let prompt = build_prompt(text, self.word_limit);
        let reply = self.backend.complete(&prompt, &self.options).await?;
        let (text, truncated) = truncate_words(reply.trim(), self.word_limit);
        let degraded = looks_like_refusal(&text);
        if degraded {
            warn!(reply = %text, "Model returned a non-summary");
        }
        Ok(Summary {
            text,
            truncated,
            degraded,
        })
    }
}

//! The cache-then-fetch-then-summarize pipeline.
//!
//! # Pipeline
//!
//! 1. **Cache**: a live entry for the query is returned as-is
//! 2. **Fetch**: one request to the news source for the page
//! 3. **Filter**: articles failing [`Article::is_displayable`] are dropped
//! 4. **Summarize**: one completion per article, strictly in source order
//! 5. **Store**: the finished page is cached, then returned
//!
//! Any failure aborts the page: nothing partial is returned or cached.
//!
//! Concurrent misses for the same query are coalesced behind a per-query
//! gate, so a burst of identical requests costs one upstream computation.
//! A page computed across a [`SummarizingFetcher::clear_cache`] or
//! [`SummarizingFetcher::invalidate`] is returned to its caller but not stored.

use crate::api::ChatCompletion;
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::error::PipelineError;
use crate::models::{Article, HeadlineQuery, SummarizedArticle};
use crate::news::NewsSource;
use crate::normalize::plain_text;
use crate::summary::Summarizer;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// A summarized page, shared between the cache and its readers.
pub type Page = Arc<Vec<SummarizedArticle>>;

/// Fetches, summarizes, and memoizes pages of headlines.
#[derive(Debug)]
pub struct SummarizingFetcher<N, C> {
    news: N,
    summarizer: Summarizer<C>,
    cache: Mutex<TtlCache<HeadlineQuery, Page>>,
    /// Bumped under the cache lock by every clear or invalidation.
    generation: AtomicU64,
    /// One gate per query ever fetched; never pruned, the key space is small.
    gates: Mutex<HashMap<HeadlineQuery, Arc<Mutex<()>>>>,
}

impl<N: NewsSource, C: ChatCompletion> SummarizingFetcher<N, C> {
    pub fn new(news: N, summarizer: Summarizer<C>, ttl: Duration) -> Self {
        Self::with_clock(news, summarizer, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(news: N, summarizer: Summarizer<C>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            news,
            summarizer,
            cache: Mutex::new(TtlCache::with_clock(ttl, clock)),
            generation: AtomicU64::new(0),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Return the summarized page for `query`, from cache when still live.
    ///
    /// # Errors
    ///
    /// A news-source failure or any single summarization failure aborts the
    /// whole page; nothing is cached in that case.
    #[instrument(level = "info", skip_all, fields(%query))]
    pub async fn fetch(&self, query: &HeadlineQuery) -> Result<Page, PipelineError> {
        if let Some(page) = self.cache.lock().await.get(query) {
            debug!(articles = page.len(), "Cache hit");
            return Ok(page);
        }

        let gate = self.gate_for(query).await;
        let _guard = gate.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(page) = self.cache.lock().await.get(query) {
            debug!(articles = page.len(), "Cache filled by concurrent fetch");
            return Ok(page);
        }

        let t0 = Instant::now();
        let generation = self.generation.load(Ordering::SeqCst);
        let page: Page = Arc::new(self.compute(query).await?);
        {
            let mut cache = self.cache.lock().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.insert(*query, page.clone());
            } else {
                debug!("Cache cleared during fetch; result not stored");
            }
        }

        info!(
            articles = page.len(),
            degraded = page.iter().filter(|p| p.summary.degraded).count(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Page summarized and cached"
        );
        Ok(page)
    }

    /// Drop every cached page; the next fetch of any query recomputes.
    #[instrument(level = "info", skip(self))]
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let dropped = cache.len();
        cache.invalidate_all();
        info!(dropped, "Cache cleared");
    }

    /// Drop the cached page for one query. Returns whether one was stored.
    pub async fn invalidate(&self, query: &HeadlineQuery) -> bool {
        let mut cache = self.cache.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        cache.invalidate(query)
    }

    async fn gate_for(&self, query: &HeadlineQuery) -> Arc<Mutex<()>> {
        self.gates
            .lock()
            .await
            .entry(*query)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn compute(&self, query: &HeadlineQuery) -> Result<Vec<SummarizedArticle>, PipelineError> {
        let fetched = self.news.top_headlines(query).await?;
        let total = fetched.len();
        let articles: Vec<Article> = fetched.into_iter().filter(Article::is_displayable).collect();
        if articles.len() < total {
            warn!(
                dropped = total - articles.len(),
                "Dropped articles without a title or URL"
            );
        }

        let summarizer = &self.summarizer;
        stream::iter(articles.into_iter().enumerate())
            .then(|(index, article)| async move {
                let body = plain_text(article.body_html());
                debug!(index, body_words = body.split_whitespace().count(), "Summarizing article");
                match summarizer.summarize(&body).await {
                    Ok(summary) => Ok(SummarizedArticle { article, summary }),
                    Err(source) => Err(PipelineError::Summarize {
                        index,
                        title: article.title_or_default().to_string(),
                        source,
                    }),
                }
            })
            .try_collect()
            .await
    }
}

//! # News in Sixty
//!
//! Fetches top headlines from NewsAPI for a country and category, strips the
//! HTML from each article body, and asks an OpenAI-compatible model for a
//! factual summary of at most sixty words.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... OPENAI_API_KEY=... news_in_sixty --country gb --category technology
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags, environment (and `.env`), optional YAML file
//! 2. **Fetching**: one NewsAPI request per page
//! 3. **Summarizing**: one completion per article, in order
//! 4. **Caching**: finished pages live for fifteen minutes
//! 5. **Output**: Markdown on stdout, optional JSON export, or interactive browsing

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod browse;
mod cache;
mod cli;
mod config;
mod cursor;
mod error;
mod fetcher;
mod models;
mod news;
mod normalize;
mod outputs;
mod summary;
mod utils;

use api::OpenAiClient;
use cli::Cli;
use config::Settings;
use fetcher::SummarizingFetcher;
use news::NewsApiClient;
use outputs::{json, markdown};
use summary::Summarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenv::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "news_in_sixty starting up");

    let args = Cli::parse();
    debug!(country = %args.country, category = %args.category, page_size = ?args.page_size, browse = args.browse, "Parsed CLI arguments");

    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Configuration is incomplete; nothing was fetched");
            return Err(e.into());
        }
    };
    debug!(?settings, "Resolved settings");

    let news = NewsApiClient::new(
        settings.news_endpoint.clone(),
        settings.news_api_key.clone(),
        settings.news_timeout,
    )?;
    let llm = OpenAiClient::new(
        settings.llm_base_url.as_str(),
        settings.openai_api_key.clone(),
        settings.model.clone(),
        settings.llm_timeout,
    )?;
    info!(model = %llm.model(), "Language model client ready");

    let summarizer = Summarizer::new(llm)
        .with_options(settings.completion.clone())
        .with_word_limit(settings.word_limit);
    let fetcher = SummarizingFetcher::new(news, summarizer, settings.cache_ttl);
    let query = settings.query(&args);

    if args.browse {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        browse::run(&fetcher, query, stdin, &mut stdout).await?;
    } else {
        let page = match fetcher.fetch(&query).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, %query, "Could not build the page");
                return Err(e.into());
            }
        };

        print!("{}", markdown::page_to_markdown(&query, &page));

        if let Some(dir) = &args.json_output_dir {
            if let Err(e) = json::write_page(&query, &page, dir).await {
                error!(error = %e, "Failed to write JSON export");
                return Err(e);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

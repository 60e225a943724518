//! Command-line interface definitions for News in Sixty.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets and the model name can also come from environment variables (or a
//! `.env` file, loaded before parsing).

use crate::models::{Category, Country, MAX_PAGE_SIZE};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News in Sixty application.
///
/// # Examples
///
/// ```sh
/// # Print today's US general headlines
/// news_in_sixty
///
/// # British technology news, five stories, also exported as JSON
/// news_in_sixty --country gb --category technology --page-size 5 -j ./json
///
/// # Step through stories one at a time
/// news_in_sixty --browse
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Country to fetch headlines for
    #[arg(long, value_enum, default_value_t = Country::Us)]
    pub country: Country,

    /// Headline category
    #[arg(long, value_enum, default_value_t = Category::General)]
    pub category: Category,

    /// Number of articles per page (defaults to the config file value, else 20)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64))]
    pub page_size: Option<u32>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// OpenAI (or compatible) API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model used for summaries (overrides the config file)
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Also write the page as JSON into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Browse stories one at a time instead of printing the whole page
    #[arg(short, long)]
    pub browse: bool,
}

//! JSON export of a summarized page.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── us_general.json
//! └── gb_technology.json
//! ```
//!
//! Each file is overwritten by the next export of the same filters.

use crate::models::{HeadlineQuery, SummarizedArticle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// The serialized form of one export.
#[derive(Debug, Serialize)]
pub struct PageExport<'a> {
    pub query: &'a HeadlineQuery,
    pub fetched_at: DateTime<Utc>,
    pub articles: &'a [SummarizedArticle],
}

/// Write `page` to `{json_output_dir}/{country}_{category}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation or writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_page(
    query: &HeadlineQuery,
    page: &[SummarizedArticle],
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let export = PageExport {
        query,
        fetched_at: Utc::now(),
        articles: page,
    };
    let json = serde_json::to_string_pretty(&export)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(format!("{}_{}.json", query.country, query.category));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = page.len(), "Wrote JSON export");
    Ok(path)
}

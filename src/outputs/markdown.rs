//! Markdown rendering of summarized pages.
//!
//! Each article renders as a block:
//!
//! ```text
//! ---
//! ## Headline
//! *Source Name • 2025-05-06*
//!
//! ![](https://example.com/image.jpg)
//!
//! Summary wrapped at 85 columns…
//!
//! [Read full article ↗](https://example.com/story)
//! ```

use crate::models::{HeadlineQuery, SummarizedArticle};
use crate::utils::wrap_text;
use std::fmt::Write;

/// Column at which summaries are wrapped.
pub const WRAP_WIDTH: usize = 85;

/// Shown in place of a summary the model refused to write.
pub const DEGRADED_NOTICE: &str = "_No summary available for this story._";

/// Render one article block.
pub fn article_to_markdown(item: &SummarizedArticle) -> String {
    let article = &item.article;
    let mut md = String::new();

    writeln!(md, "---").unwrap();
    writeln!(md, "## {}", article.title_or_default()).unwrap();

    let date = article
        .published_date()
        .map(|d| d.to_string())
        .or_else(|| article.published_at.get(..10).map(str::to_string))
        .unwrap_or_default();
    match (article.source.name.is_empty(), date.is_empty()) {
        (false, false) => writeln!(md, "*{} • {}*", article.source.name, date).unwrap(),
        (false, true) => writeln!(md, "*{}*", article.source.name).unwrap(),
        (true, false) => writeln!(md, "*{}*", date).unwrap(),
        (true, true) => {}
    }

    if let Some(image) = article.url_to_image.as_deref().filter(|s| !s.is_empty()) {
        writeln!(md, "\n![]({image})").unwrap();
    }

    if item.summary.degraded {
        writeln!(md, "\n{DEGRADED_NOTICE}").unwrap();
    } else {
        writeln!(md, "\n{}", wrap_text(&item.summary.text, WRAP_WIDTH)).unwrap();
    }

    if let Some(url) = article.url.as_deref() {
        writeln!(md, "\n[Read full article ↗]({url})").unwrap();
    }
    md
}

/// Render a whole page with a heading naming the filters.
pub fn page_to_markdown(query: &HeadlineQuery, page: &[SummarizedArticle]) -> String {
    let mut md = format!(
        "# Top {} headlines ({})\n\n",
        query.category,
        query.country.as_str().to_uppercase()
    );
    if page.is_empty() {
        md.push_str("_No stories to show._\n");
        return md;
    }
    for item in page {
        md.push_str(&article_to_markdown(item));
        md.push('\n');
    }
    md
}

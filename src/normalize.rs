//! HTML to prompt-ready plain text.

use itertools::Itertools;
use scraper::{Html, Node};

/// Convert an article's raw HTML body into plain text.
///
/// Tags are removed, entities decoded, `<script>`/`<style>` contents dropped,
/// and whitespace runs collapsed to a single space. Absent or empty input
/// yields an empty string.
pub fn plain_text(html: Option<&str>) -> String {
    let Some(html) = html.filter(|s| !s.trim().is_empty()) else {
        return String::new();
    };

    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    for node in fragment.root_element().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style"));
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }

    text.split_whitespace().join(" ")
}

//! Output generation for summarized pages.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders pages and single articles as Markdown for the terminal
//! - [`json`]: Writes a page to a JSON file for other tools

pub mod json;
pub mod markdown;

//! JSON report of a rendered notebook.

use serde::Serialize;

use super::notebook::PageSummary;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct Report<'a> {
    title: Option<&'a str>,
    page_count: usize,
    pages: &'a [PageSummary],
}

/// Serialize page summaries of one notebook.
pub fn to_json(title: Option<&str>, pages: &[PageSummary], format: JsonFormat) -> Result<String> {
    let report = Report {
        title,
        page_count: pages.len(),
        pages,
    };
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&report),
        JsonFormat::Compact => serde_json::to_string(&report),
    };

    result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
}

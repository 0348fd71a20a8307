//! Data model for scraped articles.
//!
//! A run produces a flat list of [`Article`] rows. Each row is created by the
//! extractor, optionally gets a summary attached once, and is then written to
//! the output table. Rows are independent of one another.

use serde::{Deserialize, Serialize};

/// Header row of the output table, in field order.
pub const TABLE_HEADERS: [&str; 4] = ["Title", "Tags", "Description", "URL"];

/// Name of the optional trailing column written once summaries exist.
pub const SUMMARY_HEADER: &str = "Summary";

/// Title used when an article page has no `<title>` element.
pub const NO_TITLE: &str = "No title";

/// Description used for article pages hosted on a site with no extraction rules.
pub const NO_DESCRIPTION: &str = "No description available";

/// One extracted article, i.e. one row of the output table.
///
/// Field names are renamed to the table's column headers so rows can be read
/// back with `csv` + `serde`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Page title, trimmed.
    #[serde(rename = "Title")]
    pub title: String,
    /// Contents of the `keywords` meta tag, possibly empty.
    #[serde(rename = "Tags")]
    pub tags: String,
    /// Article body assembled from the site's text blocks.
    #[serde(rename = "Description")]
    pub description: String,
    /// Absolute URL of the article page.
    #[serde(rename = "URL")]
    pub url: String,
    /// Generated summary, absent until the summarizer has run.
    #[serde(rename = "Summary", default)]
    pub summary: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        tags: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            tags: tags.into(),
            description: description.into(),
            url: url.into(),
            summary: None,
        }
    }

    /// Whether there is any text worth sending to a summarizer.
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

//! The Hacker News (thehackernews.com) extraction rules.
//!
//! Index pages carry absolute links on `a.story-link`. Article text is the
//! sequence of paragraphs inside `div.articlebody`.

use super::collect_links;
use crate::error::ExtractError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DOMAIN: &str = "thehackernews.com";

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.story-link[href]").unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.articlebody").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Article URLs linked from an index page; links must already be absolute.
pub fn article_links(index_url: &str, document: &Html) -> Vec<Result<String, ExtractError>> {
    collect_links(document, &LINK_SELECTOR, |href| {
        Url::parse(href).map(String::from).map_err(|_| ExtractError::InvalidLink {
            page: index_url.to_string(),
            href: href.to_string(),
        })
    })
}

/// Paragraphs of the article body joined by single spaces.
pub fn description(url: &str, document: &Html) -> Result<String, ExtractError> {
    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::MissingMarkup {
            url: url.to_string(),
            what: "article body",
        })?;

    Ok(body
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>())
        .join(" "))
}

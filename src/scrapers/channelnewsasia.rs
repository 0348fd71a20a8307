//! CNA (channelnewsasia.com) extraction rules.
//!
//! Index pages link articles with relative URLs through
//! `a.h6__link.list-object__heading-link`; those are resolved against the
//! site root. Article text sits in a `div.text` block (or the video
//! description block on video pages).

use super::{collect_links, stripped_text};
use crate::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DOMAIN: &str = "channelnewsasia.com";
pub const BASE_URL: &str = "https://www.channelnewsasia.com";

static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).unwrap());

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.h6__link.list-object__heading-link[href]").unwrap());

static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "div.content-detail__description.content-detail__description--video, div.text",
    )
    .unwrap()
});

/// Absolute article URLs linked from an index page.
pub fn article_links(index_url: &str, document: &Html) -> Vec<Result<String, ExtractError>> {
    collect_links(document, &LINK_SELECTOR, |href| {
        BASE.join(href).map(String::from).map_err(|_| ExtractError::InvalidLink {
            page: index_url.to_string(),
            href: href.to_string(),
        })
    })
}

/// Text of the first description block, whitespace-trimmed chunks joined by spaces.
pub fn description(url: &str, document: &Html) -> Result<String, ExtractError> {
    document
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .map(stripped_text)
        .ok_or_else(|| ExtractError::MissingMarkup {
            url: url.to_string(),
            what: "description block",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <html><body>
          <a class="h6__link list-object__heading-link" href="/singapore/scam-ring-123">Scam ring</a>
          <a class="h6__link" href="/not-a-headline">Other</a>
          <a class="h6__link list-object__heading-link" href="https://www.channelnewsasia.com/world/breach-456">Breach</a>
        </body></html>
    "#;

    #[test]
    fn test_article_links_resolve_against_base() {
        let document = Html::parse_document(INDEX);
        let links: Vec<String> = article_links("https://www.channelnewsasia.com/topic/cybersecurity", &document)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://www.channelnewsasia.com/singapore/scam-ring-123",
                "https://www.channelnewsasia.com/world/breach-456",
            ]
        );
    }

    #[test]
    fn test_description_strips_and_joins_text_nodes() {
        let document = Html::parse_document(
            r#"<div class="text">
                 <p>  Hackers   breached </p>
                 <p>the <b>ministry</b>.</p>
               </div>"#,
        );
        let text = description("https://www.channelnewsasia.com/a", &document).unwrap();
        assert_eq!(text, "Hackers   breached the ministry .");
    }

    #[test]
    fn test_description_accepts_video_block() {
        let document = Html::parse_document(
            r#"<div class="content-detail__description content-detail__description--video">Video recap</div>"#,
        );
        assert_eq!(
            description("https://www.channelnewsasia.com/a", &document).unwrap(),
            "Video recap"
        );
    }

    #[test]
    fn test_missing_description_is_an_error() {
        let document = Html::parse_document("<div class=\"other\">nothing</div>");
        let err = description("https://www.channelnewsasia.com/a", &document).unwrap_err();
        assert!(matches!(err, ExtractError::MissingMarkup { .. }));
    }
}

//! Per-site extraction of article records.
//!
//! Every URL, index page or article page alike, is mapped to a [`SourceSite`]
//! by its normalized host. Each known site has its own submodule with two
//! rules:
//!
//! 1. `article_links`: candidate article URLs on an index page
//! 2. `description`: the article body text on an article page
//!
//! Title and keyword tags are read the same way on every site.
//!
//! # Supported Sources
//!
//! | Source | Module | Links | Description |
//! |--------|--------|-------|-------------|
//! | CNA | [`channelnewsasia`] | relative, joined to site root | first `div.text` block |
//! | The Hacker News | [`thehackernews`] | absolute | `div.articlebody p` |
//!
//! Hosts that match no site resolve to [`SourceSite::Unknown`]: their index
//! pages yield no links and their article pages get a placeholder
//! description.

pub mod channelnewsasia;
pub mod thehackernews;

use crate::error::ExtractError;
use crate::fetcher::{FetchedPages, Fetcher, Transport};
use crate::models::{Article, NO_DESCRIPTION, NO_TITLE};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static KEYWORDS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="keywords"]"#).unwrap());

/// Extraction rule variant selected from a URL's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSite {
    ChannelNewsAsia,
    TheHackerNews,
    Unknown,
}

impl SourceSite {
    /// Resolve the rule variant for `url`; unparsable URLs are [`SourceSite::Unknown`].
    pub fn from_url(url: &str) -> Self {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(Self::from_host))
            .unwrap_or(Self::Unknown)
    }

    /// Match a host against the known domains, ignoring case, a leading `www.`
    /// and any other subdomain.
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if matches(channelnewsasia::DOMAIN) {
            Self::ChannelNewsAsia
        } else if matches(thehackernews::DOMAIN) {
            Self::TheHackerNews
        } else {
            Self::Unknown
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChannelNewsAsia => "channelnewsasia",
            Self::TheHackerNews => "thehackernews",
            Self::Unknown => "unknown",
        }
    }
}

/// Candidate article links on an index page, in document order.
///
/// Links that cannot be turned into an absolute URL are logged and dropped.
pub fn article_links(index_url: &str, body: &str) -> Vec<String> {
    let site = SourceSite::from_url(index_url);
    let document = Html::parse_document(body);
    let candidates = match site {
        SourceSite::ChannelNewsAsia => channelnewsasia::article_links(index_url, &document),
        SourceSite::TheHackerNews => thehackernews::article_links(index_url, &document),
        SourceSite::Unknown => {
            warn!(%index_url, "No link rules for this source; skipping index page");
            return Vec::new();
        }
    };

    candidates
        .into_iter()
        .filter_map(|link| match link {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Skipping article link");
                None
            }
        })
        .collect()
}

/// Build an [`Article`] from a fetched article page.
///
/// # Errors
///
/// Returns [`ExtractError::MissingMarkup`] when a known site's description
/// block is absent. Missing title or keywords are not errors.
pub fn parse_article(url: &str, body: &str) -> Result<Article, ExtractError> {
    let document = Html::parse_document(body);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let tags = document
        .select(&KEYWORDS_SELECTOR)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let description = match SourceSite::from_url(url) {
        SourceSite::ChannelNewsAsia => channelnewsasia::description(url, &document)?,
        SourceSite::TheHackerNews => thehackernews::description(url, &document)?,
        SourceSite::Unknown => NO_DESCRIPTION.to_string(),
    };

    Ok(Article::new(title, tags, description, url))
}

/// Turns fetched index pages into article records, fetching each linked
/// article through the shared [`Fetcher`].
#[derive(Debug)]
pub struct Extractor<'a, T> {
    fetcher: &'a Fetcher<T>,
}

impl<'a, T: Transport> Extractor<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>) -> Self {
        Self { fetcher }
    }

    /// Extract every article reachable from `pages`, one request at a time.
    ///
    /// Articles that fail to fetch or parse are logged and left out.
    #[instrument(level = "info", skip_all, fields(index_pages = pages.len()))]
    pub async fn extract_all(&self, pages: &FetchedPages) -> Vec<Article> {
        let mut articles = Vec::new();

        for (index_url, body) in pages.iter() {
            let links = article_links(index_url, body);
            info!(
                %index_url,
                source = SourceSite::from_url(index_url).name(),
                count = links.len(),
                "Indexed article links"
            );
            debug!(urls = ?links, "Article links");

            for link in links {
                match self.extract_article(&link).await {
                    Ok(article) => {
                        debug!(url = %link, title = %article.title, "Extracted article");
                        articles.push(article);
                    }
                    Err(e) => error!(url = %link, error = %e, "Error extracting article; skipping"),
                }
            }
        }

        info!(count = articles.len(), "Extracted articles");
        articles
    }

    async fn extract_article(&self, url: &str) -> Result<Article, ExtractError> {
        let body = self.fetcher.fetch(url).await?;
        parse_article(url, &body)
    }
}

/// Apply `resolve` to the `href` of every element matched by `selector`.
pub(crate) fn collect_links<F>(
    document: &Html,
    selector: &Selector,
    resolve: F,
) -> Vec<Result<String, ExtractError>>
where
    F: Fn(&str) -> Result<String, ExtractError>,
{
    document
        .select(selector)
        .filter_map(|el| el.value().attr("href"))
        .map(resolve)
        .collect()
}

/// Every descendant text node, trimmed, empties dropped, joined by one space.
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::{ScriptedTransport, agents};

    #[test]
    fn test_source_site_from_host() {
        assert_eq!(SourceSite::from_host("www.channelnewsasia.com"), SourceSite::ChannelNewsAsia);
        assert_eq!(SourceSite::from_host("CHANNELNEWSASIA.COM"), SourceSite::ChannelNewsAsia);
        assert_eq!(SourceSite::from_host("thehackernews.com"), SourceSite::TheHackerNews);
        assert_eq!(SourceSite::from_host("feeds.thehackernews.com"), SourceSite::TheHackerNews);
        assert_eq!(SourceSite::from_host("notthehackernews.com"), SourceSite::Unknown);
        assert_eq!(SourceSite::from_host("example.com"), SourceSite::Unknown);
    }

    #[test]
    fn test_source_site_from_url() {
        assert_eq!(
            SourceSite::from_url("https://www.channelnewsasia.com/topic/cybersecurity"),
            SourceSite::ChannelNewsAsia
        );
        assert_eq!(SourceSite::from_url("not a url"), SourceSite::Unknown);
    }

    #[test]
    fn test_known_source_defaults_title_and_tags() {
        let body = r#"<html><body><div class="articlebody"><p>Body.</p></div></body></html>"#;
        let article = parse_article("https://thehackernews.com/2024/05/a.html", body).unwrap();
        assert_eq!(article.title, NO_TITLE);
        assert_eq!(article.tags, "");
        assert_eq!(article.description, "Body.");
        assert_eq!(article.url, "https://thehackernews.com/2024/05/a.html");
        assert!(article.summary.is_none());
    }

    #[test]
    fn test_title_is_trimmed_and_tags_read() {
        let body = r#"<html><head>
              <title>
                 Botnet takedown | CNA
              </title>
              <meta name="keywords" content="botnet, malware">
            </head><body><div class="text"><p>Police seized servers.</p></div></body></html>"#;
        let article = parse_article("https://www.channelnewsasia.com/world/botnet-1", body).unwrap();
        assert_eq!(article.title, "Botnet takedown | CNA");
        assert_eq!(article.tags, "botnet, malware");
        assert_eq!(article.description, "Police seized servers.");
    }

    #[test]
    fn test_unknown_source_gets_placeholder_description() {
        let body = "<html><head><title>Elsewhere</title></head><body><p>text</p></body></html>";
        let article = parse_article("https://example.com/story", body).unwrap();
        assert_eq!(article.title, "Elsewhere");
        assert_eq!(article.description, NO_DESCRIPTION);
    }

    #[test]
    fn test_unknown_index_yields_no_links() {
        let body = r#"<a class="story-link" href="https://thehackernews.com/x.html">x</a>"#;
        assert!(article_links("https://example.com/news", body).is_empty());
    }

    #[tokio::test]
    async fn test_extract_all_skips_failed_articles() {
        let index = "https://thehackernews.com/search/label/Cyber%20Attack";
        let good = "https://thehackernews.com/2024/05/good.html";
        let broken = "https://thehackernews.com/2024/05/broken.html";
        let missing = "https://thehackernews.com/2024/05/missing.html";
        let index_body = format!(
            r#"<a class="story-link" href="{good}">a</a>
               <a class="story-link" href="{broken}">b</a>
               <a class="story-link" href="{missing}">c</a>"#
        );

        let transport = ScriptedTransport::default()
            .respond(good, 200, r#"<title>Good</title><div class="articlebody"><p>Fine.</p></div>"#)
            .respond(broken, 200, "<title>Broken</title><p>no body block</p>")
            .respond(missing, 404, "gone");
        let fetcher = Fetcher::new(transport, agents());
        let mut pages = FetchedPages::default();
        pages.insert(index.to_string(), index_body);

        let articles = Extractor::new(&fetcher).extract_all(&pages).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Good");
        assert_eq!(articles[0].description, "Fine.");
    }

    #[tokio::test]
    async fn test_extract_article_rotates_user_agents() {
        let index = "https://www.channelnewsasia.com/topic/cybersecurity";
        let article = "https://www.channelnewsasia.com/singapore/phishing-9";
        let transport = ScriptedTransport::default()
            .respond(article, 403, "denied")
            .respond(article, 200, r#"<title>Phishing</title><div class="text">Beware.</div>"#);
        let fetcher = Fetcher::new(transport, agents());
        let mut pages = FetchedPages::default();
        pages.insert(
            index.to_string(),
            r#"<a class="h6__link list-object__heading-link" href="/singapore/phishing-9">p</a>"#.to_string(),
        );

        let articles = Extractor::new(&fetcher).extract_all(&pages).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, article);
        assert_eq!(articles[0].description, "Beware.");
    }
}

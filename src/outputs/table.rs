//! CSV table of article records.
//!
//! The file is UTF-8 with a byte order mark so spreadsheet tools pick the
//! right encoding. Columns follow [`Article`] field order:
//!
//! ```text
//! Title,Tags,Description,URL[,Summary]
//! ```
//!
//! The `Summary` column is only present once at least one row carries a
//! summary. Every write replaces the whole file.
//!
//! Descriptions arrive here already decoded by
//! [`decode_body`](crate::encoding::decode_body), with undecodable bytes
//! replaced, so writing never fails on their content.

use crate::models::{Article, SUMMARY_HEADER, TABLE_HEADERS};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize `articles` to CSV bytes, signature included.
pub fn to_csv_bytes(articles: &[Article]) -> Result<Vec<u8>, Box<dyn Error>> {
    let with_summary = articles.iter().any(|a| a.summary.is_some());

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    if with_summary {
        writer.write_record(TABLE_HEADERS.iter().chain(std::iter::once(&SUMMARY_HEADER)))?;
    } else {
        writer.write_record(TABLE_HEADERS)?;
    }

    for article in articles {
        let mut row = vec![
            article.title.as_str(),
            article.tags.as_str(),
            article.description.as_str(),
            article.url.as_str(),
        ];
        if with_summary {
            row.push(article.summary.as_deref().unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Parse CSV bytes produced by [`to_csv_bytes`]; a leading signature is optional.
pub fn from_csv_bytes(bytes: &[u8]) -> Result<Vec<Article>, csv::Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(bytes);
    reader.deserialize().collect()
}

/// Replace the table at `path` with `articles`.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(path: &Path, articles: &[Article]) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv_bytes(articles)?;
    fs::write(path, bytes).await?;
    info!("Stored {} articles in {}", articles.len(), path.display());
    Ok(())
}

/// Load every row of the table at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_articles(path: &Path) -> Result<Vec<Article>, Box<dyn Error>> {
    let bytes = fs::read(path).await?;
    let articles = from_csv_bytes(&bytes)?;
    info!(count = articles.len(), "Loaded articles from table");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Article> {
        vec![
            Article::new(
                "Ransomware, again",
                "ransomware, healthcare",
                "Line one\nline \"two\"",
                "https://thehackernews.com/2024/05/a.html",
            ),
            Article::new("No tags", "", "Short.", "https://www.channelnewsasia.com/b"),
        ]
    }

    #[test]
    fn test_header_and_signature() {
        let bytes = to_csv_bytes(&sample()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().next(), Some("Title,Tags,Description,URL"));
    }

    #[test]
    fn test_summary_column_only_when_present() {
        let mut articles = sample();
        articles[1].summary = Some("A summary.".to_string());
        let bytes = to_csv_bytes(&articles).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().next(), Some("Title,Tags,Description,URL,Summary"));
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let articles = sample();
        let back = from_csv_bytes(&to_csv_bytes(&articles).unwrap()).unwrap();
        assert_eq!(back, articles);
    }

    #[test]
    fn test_round_trip_with_summaries() {
        let mut articles = sample();
        articles[0].summary = Some("Hospitals hit.".to_string());
        let back = from_csv_bytes(&to_csv_bytes(&articles).unwrap()).unwrap();
        assert_eq!(back[0].summary.as_deref(), Some("Hospitals hit."));
        // An empty cell reads back as no summary.
        assert_eq!(back[1].summary, None);
        assert_eq!(back[1].title, "No tags");
    }

    #[test]
    fn test_reads_table_without_signature() {
        let rows = from_csv_bytes(b"Title,Tags,Description,URL\nT,,D,https://x.test/\n").unwrap();
        assert_eq!(rows, vec![Article::new("T", "", "D", "https://x.test/")]);
    }

    #[tokio::test]
    async fn test_invalid_bytes_in_fetched_description_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        let url = "https://thehackernews.com/2024/05/leak.html";
        let raw: &[u8] = b"<html><head><meta charset=\"utf-8\"><title>Leak</title></head>\
            <body><div class=\"articlebody\"><p>Leak of \xff\xfe records</p></div></body></html>";

        let body = crate::encoding::decode_body(raw, None);
        let article = crate::scrapers::parse_article(url, &body).unwrap();
        write_articles(&path, &[article]).await.unwrap();
        let back = read_articles(&path).await.unwrap();

        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, "Leak");
        assert_eq!(back[0].description, "Leak of \u{FFFD}\u{FFFD} records");
    }

    #[tokio::test]
    async fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        write_articles(&path, &sample()).await.unwrap();
        write_articles(&path, &sample()[..1]).await.unwrap();
        assert_eq!(read_articles(&path).await.unwrap().len(), 1);
    }
}

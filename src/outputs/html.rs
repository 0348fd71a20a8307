//! HTML rendering of the article table for the email report.
//!
//! The layout mirrors a pandas `DataFrame.to_html()` table (a bordered
//! `dataframe` table with a leading row index column), which is what mail
//! readers of the digest are used to.

use crate::models::{Article, SUMMARY_HEADER, TABLE_HEADERS};
use html_escape::encode_text;
use std::fmt::Write;

/// Render `articles` as a standalone HTML table.
pub fn render_table(articles: &[Article]) -> String {
    let with_summary = articles.iter().any(|a| a.summary.is_some());
    let mut html = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(html, r#"<table border="1" class="dataframe">"#);
    let _ = writeln!(html, "  <thead>");
    let _ = writeln!(html, r#"    <tr style="text-align: right;">"#);
    let _ = writeln!(html, "      <th></th>");
    for header in TABLE_HEADERS {
        let _ = writeln!(html, "      <th>{header}</th>");
    }
    if with_summary {
        let _ = writeln!(html, "      <th>{SUMMARY_HEADER}</th>");
    }
    let _ = writeln!(html, "    </tr>");
    let _ = writeln!(html, "  </thead>");
    let _ = writeln!(html, "  <tbody>");

    for (index, article) in articles.iter().enumerate() {
        let _ = writeln!(html, "    <tr>");
        let _ = writeln!(html, "      <th>{index}</th>");
        let mut cells = vec![
            article.title.as_str(),
            article.tags.as_str(),
            article.description.as_str(),
            article.url.as_str(),
        ];
        if with_summary {
            cells.push(article.summary.as_deref().unwrap_or_default());
        }
        for cell in cells {
            let _ = writeln!(html, "      <td>{}</td>", encode_text(cell));
        }
        let _ = writeln!(html, "    </tr>");
    }

    let _ = writeln!(html, "  </tbody>");
    html.push_str("</table>");
    html
}

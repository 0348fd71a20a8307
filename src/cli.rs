//! Command-line interface definitions.
//!
//! Secrets and addresses can be passed as flags or picked up from the
//! environment; everything else about the run lives in the optional YAML
//! config, see [`crate::config::Settings`].

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which summarization backend to run after scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryStrategy {
    /// Hosted summarization API (`x-api-key` authenticated)
    Remote,
    /// Locally hosted sequence-to-sequence model server
    Local,
}

/// Scrape cybersecurity news into a CSV table, then optionally summarize and mail it.
///
/// # Examples
///
/// ```sh
/// # Scrape (or reuse an existing table)
/// cyber_news_digest -o ./articles.csv
///
/// # Re-scrape, summarize through the hosted API, mail the result
/// SUMMARY_API_KEY=... EMAIL_FROM=... EMAIL_TO=... SMTP_LOGIN=... SMTP_PASSWORD=... \
///   cyber_news_digest -f --summarize remote --email
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the CSV table to write (and reuse on later runs)
    #[arg(short, long, default_value = "articles.csv")]
    pub output: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scrape again even when the output table already exists
    #[arg(short, long)]
    pub force_refresh: bool,

    /// Summarize every article with the given backend and rewrite the table
    #[arg(long, value_enum)]
    pub summarize: Option<SummaryStrategy>,

    /// API key for the remote summarizer
    #[arg(long, env = "SUMMARY_API_KEY", hide_env_values = true)]
    pub summary_api_key: Option<String>,

    /// Email the table as an HTML report
    #[arg(long)]
    pub email: bool,

    /// Sender address of the report
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Recipient address of the report
    #[arg(long, env = "EMAIL_TO")]
    pub email_to: Option<String>,

    /// SMTP login
    #[arg(long, env = "SMTP_LOGIN")]
    pub smtp_login: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,
}

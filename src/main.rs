//! # Cyber News Digest
//!
//! Scrapes cybersecurity news sites into a CSV table, optionally summarizes
//! every article, and optionally mails the table as an HTML report.
//!
//! ## Usage
//!
//! ```sh
//! cyber_news_digest -o ./articles.csv --summarize remote --email
//! ```
//!
//! ## Architecture
//!
//! The stages run one after the other, each request awaited before the next:
//! 1. **Fetching**: download the configured index pages, rotating user agents on 403
//! 2. **Extraction**: follow article links and parse them with per-site rules
//! 3. **Persistence**: write the CSV table (or reuse the existing one)
//! 4. **Summarization**: optional, rewrites the table with a Summary column
//! 5. **Mail**: optional, sends the table as an HTML email

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod encoding;
mod error;
mod fetcher;
mod mailer;
mod models;
mod outputs;
mod scrapers;
mod summarizer;
mod utils;

use cli::{Cli, SummaryStrategy};
use config::Settings;
use fetcher::{Fetcher, ReqwestTransport, Transport};
use mailer::MailSettings;
use models::Article;
use outputs::table;
use scrapers::Extractor;
use summarizer::{LocalSummarizer, RemoteSummarizer, Summarizer};
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("cyber_news_digest starting up");

    let args = Cli::parse();
    debug!(output = %args.output.display(), config = ?args.config, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let client = Client::new();

    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Scrape or reuse ----
    let fetcher = Fetcher::new(
        ReqwestTransport::new(client.clone()),
        settings.user_agents.clone(),
    );
    let Some(articles) =
        load_or_scrape(&args.output, args.force_refresh, &fetcher, &settings.sources).await?
    else {
        return Ok(());
    };

    // ---- Summaries ----
    let articles = match args.summarize {
        Some(strategy) => match build_summarizer(strategy, &args, &settings, client) {
            Ok(backend) => summarizer::summarize_table(&args.output, &backend).await?,
            Err(e) => {
                error!(error = %e, "Summarizer not configured; skipping summaries");
                articles
            }
        },
        None => articles,
    };

    // ---- Mail ----
    if args.email {
        match mail_settings(&args, &settings) {
            Ok(mail) => {
                mailer::send_report(&mail, &articles).await;
            }
            Err(e) => error!(error = %e, "Email not configured; skipping report"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = articles.len(),
        "Execution complete"
    );

    Ok(())
}

/// Reuse the table at `path`, or scrape `sources` into it.
///
/// An existing table is read back unless `force_refresh` is set. A scrape
/// that finds nothing returns `None` and leaves any existing table as it was.
#[instrument(
    level = "info",
    skip(path, fetcher, sources),
    fields(path = %path.display(), sources = sources.len())
)]
async fn load_or_scrape<T: Transport>(
    path: &Path,
    force_refresh: bool,
    fetcher: &Fetcher<T>,
    sources: &[String],
) -> Result<Option<Vec<Article>>, Box<dyn Error>> {
    if path.exists() && !force_refresh {
        info!("Reusing existing table; pass --force-refresh to scrape again");
        return Ok(Some(table::read_articles(path).await?));
    }

    let pages = fetcher.fetch_all(sources).await;
    let articles = Extractor::new(fetcher).extract_all(&pages).await;
    if articles.is_empty() {
        warn!("No articles found.");
        return Ok(None);
    }

    table::write_articles(path, &articles).await?;
    Ok(Some(articles))
}

fn build_summarizer(
    strategy: SummaryStrategy,
    args: &Cli,
    settings: &Settings,
    client: Client,
) -> Result<Summarizer, Box<dyn Error>> {
    match strategy {
        SummaryStrategy::Remote => {
            let endpoint = settings
                .summarizer
                .remote_endpoint
                .as_deref()
                .ok_or("summarizer.remote_endpoint is not set in the config")?;
            let api_key = args
                .summary_api_key
                .as_deref()
                .ok_or("SUMMARY_API_KEY is not set")?;
            Ok(Summarizer::Remote(RemoteSummarizer::new(client, endpoint, api_key)))
        }
        SummaryStrategy::Local => {
            let endpoint = settings
                .summarizer
                .local_endpoint
                .as_deref()
                .ok_or("summarizer.local_endpoint is not set in the config")?;
            Ok(Summarizer::Local(LocalSummarizer::new(client, endpoint)))
        }
    }
}

fn mail_settings(args: &Cli, settings: &Settings) -> Result<MailSettings, Box<dyn Error>> {
    let require = |value: &Option<String>, name: &str| -> Result<String, Box<dyn Error>> {
        value.clone().ok_or_else(|| format!("{name} is not set").into())
    };
    Ok(MailSettings {
        smtp: settings.smtp.clone(),
        from: require(&args.email_from, "EMAIL_FROM")?,
        to: require(&args.email_to, "EMAIL_TO")?,
        login: require(&args.smtp_login, "SMTP_LOGIN")?,
        password: require(&args.smtp_password, "SMTP_PASSWORD")?,
    })
}

//! Article summarization.
//!
//! Two interchangeable strategies implement [`Summarize`]:
//!
//! - [`RemoteSummarizer`]: a hosted summarization API authenticated with an
//!   `x-api-key` header.
//! - [`LocalSummarizer`]: a locally hosted sequence-to-sequence model server
//!   driven with fixed decoding parameters ([`GenerationParams`]).
//!
//! A run uses exactly one of them, selected through [`Summarizer`].
//!
//! Summarization is an enrichment pass over the persisted table: the table is
//! read back, every row with a description is summarized in turn, and the
//! whole file is rewritten. A failed call leaves that row's summary as it
//! was, so a re-run never loses summaries from an earlier one.

use crate::error::TransportError;
use crate::models::Article;
use crate::outputs::table;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Produces a summary for a block of text.
pub trait Summarize {
    async fn summarize(&self, text: &str) -> Result<String, TransportError>;
}

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    summary: String,
}

/// Client for a hosted summarization endpoint.
///
/// Sends `{"text": ...}` and expects `{"summary": ...}` back.
pub struct RemoteSummarizer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for RemoteSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSummarizer")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RemoteSummarizer {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl Summarize for RemoteSummarizer {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn summarize(&self, text: &str) -> Result<String, TransportError> {
        let response: RemoteResponse = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&RemoteRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.summary)
    }
}

/// Fixed decoding parameters for local generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub min_length: u32,
    pub max_length: u32,
    pub early_stopping: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_beams: 4,
            no_repeat_ngram_size: 2,
            min_length: 30,
            max_length: 100,
            early_stopping: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParams,
}

#[derive(Debug, Deserialize)]
struct GeneratedSummary {
    summary_text: String,
}

/// Client for a local summarization model server.
///
/// Posts `{"inputs": ..., "parameters": {...}}` and reads the first
/// `summary_text` of the returned list. Generation blocks the pipeline until
/// the server answers.
#[derive(Debug)]
pub struct LocalSummarizer {
    client: Client,
    endpoint: String,
    params: GenerationParams,
}

impl LocalSummarizer {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            params: GenerationParams::default(),
        }
    }
}

impl Summarize for LocalSummarizer {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn summarize(&self, text: &str) -> Result<String, TransportError> {
        let generated: Vec<GeneratedSummary> = self
            .client
            .post(&self.endpoint)
            .json(&GenerationRequest {
                inputs: text,
                parameters: self.params,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        generated
            .into_iter()
            .next()
            .map(|g| g.summary_text)
            .ok_or_else(|| "model server returned no summary".into())
    }
}

/// The one summarization strategy chosen for a run.
#[derive(Debug)]
pub enum Summarizer {
    Remote(RemoteSummarizer),
    Local(LocalSummarizer),
}

impl Summarize for Summarizer {
    async fn summarize(&self, text: &str) -> Result<String, TransportError> {
        match self {
            Self::Remote(s) => s.summarize(text).await,
            Self::Local(s) => s.summarize(text).await,
        }
    }
}

/// Outcome counts of a summarization pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryStats {
    pub summarized: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Attach a summary to every article that has a description.
///
/// Articles without a description get no summary and never reach
/// `summarizer`.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub async fn summarize_articles<S: Summarize>(summarizer: &S, articles: &mut [Article]) -> SummaryStats {
    let mut stats = SummaryStats::default();

    for (index, article) in articles.iter_mut().enumerate() {
        if !article.has_description() {
            debug!(index, url = %article.url, "No description; leaving summary empty");
            article.summary = None;
            stats.skipped += 1;
            continue;
        }

        let t0 = Instant::now();
        match summarizer.summarize(&article.description).await {
            Ok(summary) => {
                debug!(
                    index,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    summary = %truncate_for_log(&summary, 120),
                    "Summarized article"
                );
                article.summary = Some(summary);
                stats.summarized += 1;
            }
            Err(e) => {
                warn!(
                    index,
                    url = %article.url,
                    kept_previous = article.summary.is_some(),
                    error = %e,
                    "Error summarizing article"
                );
                stats.failed += 1;
            }
        }
    }

    info!(
        summarized = stats.summarized,
        skipped = stats.skipped,
        failed = stats.failed,
        "Summarization complete"
    );
    stats
}

/// Summarize the table stored at `path` and rewrite it with a Summary column.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn summarize_table<S: Summarize>(
    path: &Path,
    summarizer: &S,
) -> Result<Vec<Article>, Box<dyn Error>> {
    let mut articles = table::read_articles(path).await?;
    summarize_articles(summarizer, &mut articles).await;
    table::write_articles(path, &articles).await?;
    Ok(articles)
}

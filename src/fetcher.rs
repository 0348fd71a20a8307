//! HTTP fetching with user agent rotation.
//!
//! The rotation policy lives in [`Fetcher`]; the actual HTTP client sits
//! behind the [`Transport`] trait so the policy can be exercised without a
//! network.
//!
//! # Policy
//!
//! For each URL the user agents are tried in order:
//!
//! - `2xx`: keep the body, stop.
//! - `403`: log and move on to the next user agent.
//! - any other status or a transport error: give up on the URL.
//!
//! Requests are issued one at a time with no timeout.

use crate::encoding::{charset_from_content_type, decode_body};
use crate::error::{FetchError, TransportError};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, instrument, warn};

/// Status and decoded body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Issues a single GET request with the given `User-Agent`.
pub trait Transport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;
        let status = response.status();
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type)
            .map(str::to_owned);
        let bytes = response.bytes().await?;
        Ok(HttpResponse {
            status,
            body: decode_body(&bytes, charset.as_deref()),
        })
    }
}

/// Bodies of the URLs that were fetched successfully, in request order.
///
/// Each URL appears at most once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchedPages {
    pages: Vec<(String, String)>,
}

impl FetchedPages {
    /// Store `body` for `url`, replacing an earlier body in place.
    pub fn insert(&mut self, url: String, body: String) {
        match self.pages.iter_mut().find(|(u, _)| *u == url) {
            Some(entry) => entry.1 = body,
            None => self.pages.push((url, body)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().map(|(u, b)| (u.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug)]
pub struct Fetcher<T> {
    transport: T,
    user_agents: Vec<String>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, user_agents: Vec<String>) -> Self {
        Self {
            transport,
            user_agents,
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch one URL, rotating user agents on 403.
    ///
    /// # Errors
    ///
    /// - [`FetchError::AccessDenied`] once every user agent got a 403
    /// - [`FetchError::Status`] on the first other non-success status
    /// - [`FetchError::Transport`] on a network failure
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if self.user_agents.is_empty() {
            return Err(FetchError::NoUserAgents);
        }

        for (attempt, user_agent) in self.user_agents.iter().enumerate() {
            let response = self
                .transport
                .get(url, user_agent)
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                })?;

            if response.status == StatusCode::FORBIDDEN {
                warn!(
                    %url,
                    attempt = attempt + 1,
                    %user_agent,
                    "403 fetching page; trying next user agent"
                );
                continue;
            }
            if !response.status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status,
                });
            }

            debug!(%url, bytes = response.body.len(), "Fetched page");
            return Ok(response.body);
        }

        Err(FetchError::AccessDenied {
            url: url.to_string(),
        })
    }

    /// Fetch every URL in turn, keeping only the ones that succeeded.
    ///
    /// A URL listed more than once is fetched once.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn fetch_all(&self, urls: &[String]) -> FetchedPages {
        let results: Vec<(String, Result<String, FetchError>)> = stream::iter(urls.iter().unique())
            .then(|url| async move { (url.clone(), self.fetch(url).await) })
            .collect()
            .await;

        let mut pages = FetchedPages::default();
        for (url, result) in results {
            match result {
                Ok(body) => pages.insert(url, body),
                Err(e) => error!(%url, error = %e, "Error fetching page"),
            }
        }

        info!(requested = urls.len(), fetched = pages.len(), "Fetched index pages");
        pages
    }
}

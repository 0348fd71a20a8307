//! Error types for the fetch and extraction stages.
//!
//! Both stages recover per item: a [`FetchError`] or [`ExtractError`] is
//! logged by the caller and the item is dropped, the run keeps going.

use reqwest::StatusCode;
use std::error::Error;
use thiserror::Error;

/// Boxed transport failure as reported by a [`crate::fetcher::Transport`].
pub type TransportError = Box<dyn Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("access denied fetching {url} with every configured user agent")]
    AccessDenied { url: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: StatusCode },

    #[error("error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("no user agents configured")]
    NoUserAgents,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("missing {what} in {url}")]
    MissingMarkup { url: String, what: &'static str },

    #[error("unusable article link {href:?} on {page}")]
    InvalidLink { page: String, href: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

//! Typed errors for the scraping pipeline.
//!
//! Only whole-call failures live here. A field that cannot be found is not
//! an error; it is simply left empty on the listing.

use crate::models::Source;
use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by [`crate::scrape_car_listing`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The input is not a parseable absolute URL
    #[error("invalid URL: {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// No registered extractor handles the URL's host
    #[error("unsupported marketplace: {url}")]
    UnsupportedMarketplace { url: String },

    /// Fetching or extracting failed for a supported marketplace
    #[error("{marketplace} scraper failed for {url}: {cause}")]
    Execution {
        url: String,
        marketplace: Source,
        #[source]
        cause: StageError,
    },
}

impl ScrapeError {
    /// The caller sent something this pipeline can never handle.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScrapeError::InvalidUrl { .. } | ScrapeError::UnsupportedMarketplace { .. }
        )
    }

    /// The target site (or the network to it) failed.
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, ScrapeError::Execution { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ScrapeError::Execution {
                cause: StageError::Fetch(FetchError::Cancelled),
                ..
            }
        )
    }
}

/// The pipeline stage that raised an execution failure
#[derive(Debug, Error)]
pub enum StageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

/// Errors from fetching and decoding a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status}: {text}")]
    Status { status: StatusCode, text: String },

    /// Connection, TLS or body transfer failure
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The configured request timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// The caller's cancellation token fired
    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// Errors an extractor raises when a page cannot be used at all
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document has no text content whatsoever
    #[error("document is empty")]
    EmptyDocument,
}

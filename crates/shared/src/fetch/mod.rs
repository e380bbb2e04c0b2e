use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

mod extract;
mod http;

pub use extract::{ExtractedPage, extract_page_text};
pub use http::{HttpContentFetcher, normalize_url};

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<PageContent, FetchError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub content: String,
    /// The URL actually fetched, after normalization.
    pub url: String,
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("url is invalid: {0}")]
    InvalidUrl(String),
    #[error("page request timed out")]
    Timeout,
    #[error("page request failed: {0}")]
    Unavailable(String),
    #[error("page responded with status {0}")]
    Status(u16),
    #[error("page body could not be read")]
    BodyRead,
    #[error("no readable content could be extracted from the page")]
    NoContent,
    #[error("failed to build page http client: {0}")]
    HttpClient(String),
}

/// Turns a URL into readable page text. Empty extracted content is an
/// error, never an empty `PageContent`.
pub trait ContentFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

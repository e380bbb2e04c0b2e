use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{Span, debug, warn};
use url::Url;

use super::extract::extract_page_text;
use super::{ContentFetcher, FetchError, FetchFuture, PageContent};

const PAGE_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; url-reader/0.1; +https://github.com/url-reader)";
const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Trims the raw URL, assumes `https://` when no scheme is given and
/// rejects anything the URL parser will not accept.
pub fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyUrl);
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(FetchError::InvalidUrl("url has no host".to_string()));
    }
    Ok(url)
}

#[derive(Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
    log: Span,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration, log: Span) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::HttpClient(err.to_string()))?;

        Ok(Self { client, log })
    }

    async fn fetch_page(&self, raw_url: &str) -> Result<PageContent, FetchError> {
        let url = normalize_url(raw_url)?;

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, PAGE_USER_AGENT)
            .header(ACCEPT, PAGE_ACCEPT)
            .send()
            .await
            .map_err(|err| {
                warn!(parent: &self.log, url = %url, error = %err, "page request failed");
                if err.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Unavailable(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(parent: &self.log, url = %url, status = status.as_u16(), "page responded with error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|err| {
            warn!(parent: &self.log, url = %url, error = %err, "page body read failed");
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::BodyRead
            }
        })?;

        let page = extract_page_text(&body);
        if page.content.is_empty() {
            warn!(parent: &self.log, url = %url, "page contained no readable content");
            return Err(FetchError::NoContent);
        }

        debug!(
            parent: &self.log,
            url = %url,
            title = %page.title,
            content_chars = page.content.chars().count(),
            "page content extracted"
        );

        Ok(PageContent {
            title: page.title,
            content: page.content,
            url: url.to_string(),
        })
    }
}

impl ContentFetcher for HttpContentFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.fetch_page(url))
    }
}

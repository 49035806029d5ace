//! Fetch layer contract and the HTTP implementation
//!
//! The crawler consumes a single contract from the fetch layer: given a URL,
//! produce a [`FetchOutcome`]. Network I/O, timeouts and HTML parsing all live
//! behind the [`Fetcher`] trait so production and test backends can be
//! injected at construction.

use crate::config::HttpConfig;
use crate::crawler::parser::parse_html;
use crate::filter::PageMeta;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Outcome of fetching one URL
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Whether the page was fetched successfully
    pub success: bool,

    /// Final URL after redirects
    pub url: String,

    /// Page body, opaque to the crawler
    pub content: String,

    /// Response headers keyed by lowercase name
    pub response_headers: HashMap<String, String>,

    /// Absolute URLs found on the page, in document order
    pub discovered_links: Vec<String>,

    /// Error description for failed fetches
    pub error_message: Option<String>,

    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,

    /// Page title, when one was extracted
    pub title: Option<String>,
}

impl FetchOutcome {
    /// A failed fetch with no response
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: url.into(),
            error_message: Some(error.into()),
            ..Self::default()
        }
    }

    /// The response Content-Type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.response_headers.get("content-type").map(String::as_str)
    }
}

impl From<&FetchOutcome> for PageMeta {
    fn from(outcome: &FetchOutcome) -> Self {
        Self {
            content_type: outcome.content_type().map(str::to_string),
            title: outcome.title.clone(),
        }
    }
}

/// Fetch collaborator
///
/// Implementations never fail: every error is reported inside the returned
/// outcome with `success` set to false. Per-page timeouts and retries are the
/// implementation's concern.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// Production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the `[http]` configuration
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the client cannot be constructed.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::failure(url.as_str(), classify_error(&e)),
        };

        let status = response.status();
        let final_url = response.url().clone();
        let response_headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        if !status.is_success() {
            return FetchOutcome {
                url: final_url.to_string(),
                response_headers,
                status_code: Some(status.as_u16()),
                error_message: Some(format!("HTTP {}", status)),
                ..FetchOutcome::default()
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return FetchOutcome {
                    url: final_url.to_string(),
                    response_headers,
                    status_code: Some(status.as_u16()),
                    error_message: Some(classify_error(&e)),
                    ..FetchOutcome::default()
                }
            }
        };

        let is_html = response_headers
            .get("content-type")
            .map(|ct| is_html_content_type(ct))
            .unwrap_or(true);

        let (discovered_links, title) = if is_html {
            let parsed = parse_html(&body, &final_url);
            (parsed.links, parsed.title)
        } else {
            tracing::debug!("Not parsing non-HTML body of {}", final_url);
            (Vec::new(), None)
        };

        FetchOutcome {
            success: true,
            url: final_url.to_string(),
            content: body,
            response_headers,
            discovered_links,
            error_message: None,
            status_code: Some(status.as_u16()),
            title,
        }
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("text/html") || lower.contains("application/xhtml")
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}

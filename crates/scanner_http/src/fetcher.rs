// crates/scanner_http/src/fetcher.rs
//! HTTP fetcher with linear-backoff retries

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, instrument};

use subtake_common::{Fetcher, HttpResponse, ScanOptions, SubtakeError, SubtakeResult};

use crate::body::shape_body;

pub const MAX_REDIRECTS: usize = 10;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const ACCEPT_ENCODING: &str = "gzip, deflate";

/// Fetches URLs over a single shared connection pool.
///
/// Only transport failures are retried; any HTTP status counts as a response.
/// Attempt `n` (0-based) is preceded by a sleep of `n * backoff_unit`.
pub struct HttpFetcher {
    client: Client,
    attempts: u32,
    backoff_unit: Duration,
}

impl HttpFetcher {
    pub fn new(options: &ScanOptions) -> SubtakeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SubtakeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            attempts: options.attempts(),
            backoff_unit: Duration::from_secs(1),
        })
    }

    /// Override the backoff step (1s by default).
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// One request, no retries.
    async fn attempt(&self, url: &str) -> SubtakeResult<HttpResponse> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;

        let status_code = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let raw = response.bytes().await.map_err(classify_error)?;

        Ok(HttpResponse {
            url: url.to_string(),
            status_code,
            headers,
            body: shape_body(&raw),
            error: None,
        })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> HttpResponse {
        let mut last_error: Option<SubtakeError> = None;

        for attempt in 0..self.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.backoff_unit * attempt).await;
            }

            match self.attempt(url).await {
                Ok(response) => return response,
                Err(e) if e.is_retryable() => {
                    debug!("attempt {} for {} failed: {}", attempt + 1, url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    return HttpResponse::failed(
                        url,
                        format!("request failed after {} attempts: {}", attempt + 1, e),
                    );
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        HttpResponse::failed(
            url,
            format!("request failed after {} attempts: {}", self.attempts, reason),
        )
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> HttpResponse {
        HttpFetcher::fetch(self, url).await
    }
}

/// One value per header name; the first occurrence wins.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers.iter() {
        map.entry(name.as_str().to_string())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

fn classify_error(err: reqwest::Error) -> SubtakeError {
    let message = error_chain(&err);
    if err.is_redirect() {
        SubtakeError::RedirectLimit(message)
    } else {
        SubtakeError::Transport(message)
    }
}

/// Flatten an error and its sources into "outer: inner: root".
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = source.source();
    }
    message
}

//! HTTP(S) fetcher: retries on transient failures with exponential backoff,
//! honors a `follow_redirects` switch, and carries fingerprinted headers.
//! Retry/backoff/SSRF structure is ported from the crawler's original
//! request-building logic.

use std::time::Duration;

use async_trait::async_trait;
use docsforge_shared::{Error, Result};
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::fingerprint::merge_headers;
use crate::ssrf::is_ssrf_target;
use crate::{FetchOptions, FetchOutput, Fetcher};

const DEFAULT_BASE_BACKOFF_MS: u64 = 1000;
const DEFAULT_MAX_ATTEMPTS: u32 = 6;
const DEFAULT_REDIRECT_CAP: usize = 5;

fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status.as_u16(),
        408 | 429 | 500 | 502 | 503 | 504 | 525
    )
}

pub struct HttpFetcher {
    client_following: Client,
    client_refusing: Client,
    allow_localhost: bool,
    base_backoff_ms: u64,
    max_attempts: u32,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let user_agent = crate::fingerprint::default_headers()
            .get(reqwest::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("docsforge")
            .to_string();

        let client_following = Client::builder()
            .user_agent(&user_agent)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_REDIRECT_CAP))
            .timeout(timeout)
            .build()
            .expect("HTTP client configuration is valid");

        let client_refusing = Client::builder()
            .user_agent(&user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .expect("HTTP client configuration is valid");

        Self {
            client_following,
            client_refusing,
            allow_localhost: false,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Allow localhost/private IPs — for integration tests against a mock
    /// server bound to 127.0.0.1.
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    #[cfg(test)]
    pub fn with_backoff(mut self, base_backoff_ms: u64, max_attempts: u32) -> Self {
        self.base_backoff_ms = base_backoff_ms;
        self.max_attempts = max_attempts;
        self
    }

    async fn sleep_or_cancel(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = cancel.cancelled() => true,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn can_fetch(&self, url: &Url) -> bool {
        url.scheme() == "http" || url.scheme() == "https"
    }

    #[instrument(skip(self, options), fields(%url))]
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutput> {
        if is_ssrf_target(url, self.allow_localhost) {
            return Err(Error::fetch_failed(
                url.as_str(),
                "target blocked by SSRF guard",
                false,
            ));
        }

        let client = if options.follow_redirects {
            &self.client_following
        } else {
            &self.client_refusing
        };
        let headers = merge_headers(&options.headers);

        let mut attempt: u32 = 0;
        loop {
            if options.cancel.is_cancelled() {
                return Err(Error::fetch_failed(url.as_str(), "cancelled", false));
            }

            let response = client.get(url.clone()).headers(headers.clone()).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_redirection() && !options.follow_redirects {
                        let target = resp
                            .headers()
                            .get(reqwest::header::LOCATION)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        return Err(Error::RedirectEncountered {
                            original: url.to_string(),
                            target,
                            status: status.as_u16(),
                        });
                    }

                    if status.is_success() {
                        let mime_type = resp
                            .headers()
                            .get(reqwest::header::CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.split(';').next().unwrap_or(s).trim().to_string())
                            .unwrap_or_else(|| "application/octet-stream".to_string());
                        let charset = resp
                            .headers()
                            .get(reqwest::header::CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.split("charset=").nth(1))
                            .map(|s| s.trim().to_string());
                        let source_url = resp.url().to_string();
                        let bytes = resp.bytes().await.map_err(|e| {
                            Error::fetch_failed(url.as_str(), format!("body read failed: {e}"), true)
                        })?;

                        return Ok(FetchOutput {
                            bytes: bytes.to_vec(),
                            mime_type,
                            charset,
                            source_url,
                            encoding: None,
                        });
                    }

                    if is_transient_status(status) && attempt + 1 < self.max_attempts {
                        let delay = Duration::from_millis(self.base_backoff_ms * 2u64.pow(attempt));
                        warn!(%url, %status, attempt, "transient HTTP error, retrying");
                        if self.sleep_or_cancel(delay, &options.cancel).await {
                            return Err(Error::fetch_failed(url.as_str(), "cancelled", false));
                        }
                        attempt += 1;
                        continue;
                    }

                    return Err(Error::fetch_failed(
                        url.as_str(),
                        format!("HTTP {status}"),
                        is_transient_status(status),
                    ));
                }
                Err(e) => {
                    if e.is_redirect() {
                        return Err(Error::fetch_failed(
                            url.as_str(),
                            "too many redirects",
                            false,
                        ));
                    }

                    if attempt + 1 < self.max_attempts {
                        let delay = Duration::from_millis(self.base_backoff_ms * 2u64.pow(attempt));
                        warn!(%url, error = %e, attempt, "network error, retrying");
                        if self.sleep_or_cancel(delay, &options.cancel).await {
                            return Err(Error::fetch_failed(url.as_str(), "cancelled", false));
                        }
                        attempt += 1;
                        continue;
                    }

                    debug!(%url, error = %e, "giving up after max attempts");
                    return Err(Error::fetch_failed(url.as_str(), e.to_string(), true));
                }
            }
        }
    }
}

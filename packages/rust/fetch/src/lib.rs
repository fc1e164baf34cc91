//! The fetcher set (spec §4.A): a capability-based dispatcher over HTTP,
//! local-file, and source-hosting-API fetchers. Generalizes the teacher's
//! `PlatformAdapter`/`AdapterRegistry` dispatch (try-in-priority-order, with
//! a fetcher that always matches) from content-adapter dispatch to transport
//! dispatch.

pub mod file;
pub mod fingerprint;
pub mod http;
pub mod source_host;
mod ssrf;

use std::collections::HashMap;

use async_trait::async_trait;
use docsforge_shared::Result;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use file::FileFetcher;
pub use http::HttpFetcher;
pub use source_host::SourceHostFetcher;

/// Bytes and metadata returned by any fetcher.
#[derive(Debug, Clone)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub charset: Option<String>,
    pub source_url: String,
    pub encoding: Option<String>,
}

/// Per-request options threaded through to whichever fetcher handles a URL.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub follow_redirects: bool,
    pub headers: HashMap<String, String>,
    pub cancel: CancellationToken,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            headers: HashMap::new(),
            cancel: CancellationToken::new(),
        }
    }
}

/// A transport capable of retrieving raw bytes for some subset of URLs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &str;

    fn can_fetch(&self, url: &Url) -> bool;

    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutput>;
}

/// Dispatches to the first registered fetcher whose `can_fetch` returns true.
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self {
            fetchers: Vec::new(),
        }
    }

    pub fn register(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    pub fn dispatch(&self, url: &Url) -> Option<&dyn Fetcher> {
        self.fetchers
            .iter()
            .find(|f| f.can_fetch(url))
            .map(|f| f.as_ref())
    }

    pub async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchOutput> {
        match self.dispatch(url) {
            Some(fetcher) => fetcher.fetch(url, options).await,
            None => Err(docsforge_shared::Error::fetch_failed(
                url.as_str(),
                "no registered fetcher can handle this URL",
                false,
            )),
        }
    }
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new().register(Box::new(FileFetcher::new())).register(Box::new(HttpFetcher::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysMatch;

    #[async_trait]
    impl Fetcher for AlwaysMatch {
        fn name(&self) -> &str {
            "always"
        }
        fn can_fetch(&self, _url: &Url) -> bool {
            true
        }
        async fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<FetchOutput> {
            Ok(FetchOutput {
                bytes: b"ok".to_vec(),
                mime_type: "text/plain".into(),
                charset: None,
                source_url: url.to_string(),
                encoding: None,
            })
        }
    }

    struct NeverMatch;

    #[async_trait]
    impl Fetcher for NeverMatch {
        fn name(&self) -> &str {
            "never"
        }
        fn can_fetch(&self, _url: &Url) -> bool {
            false
        }
        async fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<FetchOutput> {
            panic!("should never be called for {url}");
        }
    }

    #[tokio::test]
    async fn dispatches_to_first_matching_fetcher() {
        let registry = FetcherRegistry::new()
            .register(Box::new(NeverMatch))
            .register(Box::new(AlwaysMatch));

        let url = Url::parse("https://example.com/").unwrap();
        let output = registry.fetch(&url, &FetchOptions::default()).await.unwrap();
        assert_eq!(output.bytes, b"ok");
    }

    #[tokio::test]
    async fn no_matching_fetcher_fails() {
        let registry = FetcherRegistry::new().register(Box::new(NeverMatch));
        let url = Url::parse("https://example.com/").unwrap();
        let err = registry.fetch(&url, &FetchOptions::default()).await.unwrap_err();
        assert_eq!(err.kind_name(), "FetchFailed");
    }
}

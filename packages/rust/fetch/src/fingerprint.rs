//! Synthesized browser-like headers so documentation sites that gate on
//! User-Agent/Accept sniffing don't immediately bounce the crawler.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 docsforge/",
    env!("CARGO_PKG_VERSION")
);

/// Build the default fingerprint header set. Caller-supplied headers
/// override these (see [`merge_headers`]).
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers
}

/// Merge caller-supplied headers into the fingerprint set; caller values win.
pub fn merge_headers(caller: &std::collections::HashMap<String, String>) -> HeaderMap {
    let mut headers = default_headers();
    for (key, value) in caller {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, val);
        }
    }
    headers
}

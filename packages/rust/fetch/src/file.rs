//! `file://` fetcher: percent-decodes the path, reads bytes from disk, and
//! infers a MIME type from the extension with a null-byte scan to tell
//! binary content from text.

use async_trait::async_trait;
use docsforge_shared::{Error, Result};
use url::Url;

use crate::{FetchOptions, FetchOutput, Fetcher};

fn mime_for_extension(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
        Some(ext) => match ext.as_str() {
            "html" | "htm" => "text/html",
            "md" | "markdown" => "text/markdown",
            "txt" => "text/plain",
            "json" => "application/json",
            _ => "application/octet-stream",
        },
        None => "application/octet-stream",
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8192).any(|&b| b == 0)
}

pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    fn name(&self) -> &str {
        "file"
    }

    fn can_fetch(&self, url: &Url) -> bool {
        url.scheme() == "file"
    }

    async fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<FetchOutput> {
        let path = url
            .to_file_path()
            .map_err(|_| Error::fetch_failed(url.as_str(), "invalid file:// URL", false))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::io(path.clone(), e))?;

        let mut mime_type = mime_for_extension(&path).to_string();
        if mime_type == "application/octet-stream" && !looks_binary(&bytes) {
            mime_type = "text/plain".to_string();
        }

        Ok(FetchOutput {
            bytes,
            mime_type,
            charset: Some("utf-8".to_string()),
            source_url: url.to_string(),
            encoding: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn fetches_local_html_file() {
        let mut file = tempfile_with_contents("<html><body>hi</body></html>", "html");
        let url = Url::from_file_path(file.path()).unwrap();
        let out = FileFetcher::new().fetch(&url, &FetchOptions::default()).await.unwrap();
        assert_eq!(out.mime_type, "text/html");
        assert_eq!(out.bytes, b"<html><body>hi</body></html>");
        file.flush().ok();
    }

    #[tokio::test]
    async fn classifies_binary_content_without_known_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("docsforge-test-{}.bin", uuid::Uuid::now_v7()));
        std::fs::write(&path, [0u8, 1, 2, 3]).unwrap();
        let url = Url::from_file_path(&path).unwrap();
        let out = FileFetcher::new().fetch(&url, &FetchOptions::default()).await.unwrap();
        assert_eq!(out.mime_type, "application/octet-stream");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let url = Url::from_file_path("/nonexistent/docsforge-test-missing.html").unwrap();
        let err = FileFetcher::new().fetch(&url, &FetchOptions::default()).await.unwrap_err();
        assert_eq!(err.kind_name(), "IoError");
    }

    fn tempfile_with_contents(contents: &str, ext: &str) -> std::fs::File {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("docsforge-test-{}.{}", uuid::Uuid::now_v7(), ext));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        // Re-open for reading path stability; the fetcher reads by path, not handle.
        std::fs::File::open(&path).unwrap()
    }
}

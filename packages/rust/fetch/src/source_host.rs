//! Optional source-hosting-API fetcher (spec §4.A): recognizes GitHub
//! repository URLs, lists Markdown files via the tree API (trying a set of
//! default branch names), and assembles them into one combined document.

use async_trait::async_trait;
use docsforge_shared::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{FetchOptions, FetchOutput, Fetcher};

const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

struct GitHubRepo {
    owner: String,
    repo: String,
}

fn parse_github_repo(url: &Url) -> Option<GitHubRepo> {
    if url.host_str() != Some("github.com") {
        return None;
    }
    let mut segments = url.path_segments()?;
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.trim_end_matches(".git").to_string();
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(GitHubRepo { owner, repo })
}

/// Fetches all Markdown files from a GitHub repository and concatenates them
/// into one document, separated by a header naming each file's path.
pub struct SourceHostFetcher {
    client: Client,
}

impl SourceHostFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("docsforge/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("HTTP client configuration is valid"),
        }
    }

    async fn list_markdown_paths(&self, repo: &GitHubRepo, branch: &str) -> Result<Option<Vec<String>>> {
        let api_url = format!(
            "https://api.github.com/repos/{}/{}/git/trees/{}?recursive=1",
            repo.owner, repo.repo, branch
        );

        let response = self
            .client
            .get(&api_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| Error::fetch_failed(&api_url, e.to_string(), true))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::fetch_failed(
                &api_url,
                format!("HTTP {}", response.status()),
                false,
            ));
        }

        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|e| Error::fetch_failed(&api_url, format!("invalid tree response: {e}"), false))?;

        if tree.truncated {
            tracing::warn!(owner = %repo.owner, repo = %repo.repo, "GitHub tree listing truncated");
        }

        let paths = tree
            .tree
            .into_iter()
            .filter(|e| e.entry_type == "blob" && is_markdown_path(&e.path))
            .map(|e| e.path)
            .collect();

        Ok(Some(paths))
    }

    async fn fetch_raw_file(&self, repo: &GitHubRepo, branch: &str, path: &str) -> Result<String> {
        let raw_url = format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            repo.owner, repo.repo, branch, path
        );
        let response = self
            .client
            .get(&raw_url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(&raw_url, e.to_string(), true))?;

        if !response.status().is_success() {
            return Err(Error::fetch_failed(
                &raw_url,
                format!("HTTP {}", response.status()),
                false,
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch_failed(&raw_url, format!("body read failed: {e}"), true))
    }
}

fn is_markdown_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

impl Default for SourceHostFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for SourceHostFetcher {
    fn name(&self) -> &str {
        "source_host"
    }

    fn can_fetch(&self, url: &Url) -> bool {
        parse_github_repo(url).is_some()
    }

    async fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<FetchOutput> {
        let repo = parse_github_repo(url)
            .ok_or_else(|| Error::fetch_failed(url.as_str(), "not a recognized GitHub repo URL", false))?;

        let mut paths = None;
        let mut used_branch = "";
        for branch in DEFAULT_BRANCHES {
            if let Some(found) = self.list_markdown_paths(&repo, branch).await? {
                paths = Some(found);
                used_branch = branch;
                break;
            }
        }

        let paths = paths.ok_or_else(|| {
            Error::fetch_failed(
                url.as_str(),
                format!("no branch found among {DEFAULT_BRANCHES:?}"),
                false,
            )
        })?;

        let mut combined = String::new();
        for path in &paths {
            let content = self.fetch_raw_file(&repo, used_branch, path).await?;
            combined.push_str(&format!("\n\n<!-- {path} -->\n\n"));
            combined.push_str(&content);
        }

        Ok(FetchOutput {
            bytes: combined.into_bytes(),
            mime_type: "text/markdown".to_string(),
            charset: Some("utf-8".to_string()),
            source_url: url.to_string(),
            encoding: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_github_repo_urls() {
        let url = Url::parse("https://github.com/rust-lang/rust").unwrap();
        let repo = parse_github_repo(&url).unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.repo, "rust");
    }

    #[test]
    fn rejects_non_github_hosts() {
        let url = Url::parse("https://gitlab.com/rust-lang/rust").unwrap();
        assert!(parse_github_repo(&url).is_none());
    }

    #[test]
    fn can_fetch_matches_only_github_repo_urls() {
        let fetcher = SourceHostFetcher::new();
        assert!(fetcher.can_fetch(&Url::parse("https://github.com/owner/repo").unwrap()));
        assert!(!fetcher.can_fetch(&Url::parse("https://example.com/docs").unwrap()));
    }

    #[test]
    fn markdown_path_detection() {
        assert!(is_markdown_path("README.md"));
        assert!(is_markdown_path("docs/guide.MDX"));
        assert!(!is_markdown_path("src/lib.rs"));
    }
}

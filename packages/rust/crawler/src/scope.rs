//! Crawl-scope predicates: decide whether a candidate link stays within
//! the job's configured boundary relative to the seed URL. Adapted from
//! the original `CrawlScope`/`glob_to_regex` host-matching logic, replacing
//! path-glob matching with the spec's three named scope modes.

use docsforge_shared::CrawlScope;
use url::Url;

/// Evaluates whether URLs are in scope for a crawl job relative to its seed.
pub struct ScopeGuard {
    mode: CrawlScope,
    seed_host: String,
    seed_dir: String,
}

impl ScopeGuard {
    pub fn new(seed: &Url, mode: CrawlScope) -> Self {
        let seed_host = seed.host_str().unwrap_or("").to_string();
        let seed_dir = seed_dir_of(seed);
        Self { mode, seed_host, seed_dir }
    }

    pub fn in_scope(&self, candidate: &Url) -> bool {
        if candidate.scheme() != "http" && candidate.scheme() != "https" {
            return false;
        }

        let host = candidate.host_str().unwrap_or("");

        match self.mode {
            CrawlScope::Subpages => host == self.seed_host && candidate.path().starts_with(&self.seed_dir),
            CrawlScope::Hostname => host == self.seed_host,
            CrawlScope::Domain => same_registrable_domain(host, &self.seed_host),
        }
    }
}

fn seed_dir_of(seed: &Url) -> String {
    let path = seed.path();
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// True when `host` is the same as `seed_host` or a subdomain of it.
fn same_registrable_domain(host: &str, seed_host: &str) -> bool {
    if host == seed_host {
        return true;
    }
    host.ends_with(&format!(".{seed_host}"))
}

/// Normalize a URL for the visited set: strip fragment, keep query, drop a
/// trailing slash on non-root paths.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    let mut s = normalized.to_string();
    if s.ends_with('/') && s.matches('/').count() > 3 {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subpages_requires_same_host_and_path_prefix() {
        let seed = Url::parse("https://docs.example.com/guide/intro").unwrap();
        let guard = ScopeGuard::new(&seed, CrawlScope::Subpages);

        assert!(guard.in_scope(&Url::parse("https://docs.example.com/guide/next").unwrap()));
        assert!(!guard.in_scope(&Url::parse("https://docs.example.com/other/page").unwrap()));
        assert!(!guard.in_scope(&Url::parse("https://other.example.com/guide/next").unwrap()));
    }

    #[test]
    fn hostname_ignores_path() {
        let seed = Url::parse("https://docs.example.com/guide/intro").unwrap();
        let guard = ScopeGuard::new(&seed, CrawlScope::Hostname);

        assert!(guard.in_scope(&Url::parse("https://docs.example.com/anything").unwrap()));
        assert!(!guard.in_scope(&Url::parse("https://blog.example.com/anything").unwrap()));
    }

    #[test]
    fn domain_allows_subdomains() {
        let seed = Url::parse("https://docs.example.com/guide/intro").unwrap();
        let guard = ScopeGuard::new(&seed, CrawlScope::Domain);

        assert!(guard.in_scope(&Url::parse("https://blog.example.com/post").unwrap()));
        assert!(guard.in_scope(&Url::parse("https://docs.example.com/other").unwrap()));
        assert!(!guard.in_scope(&Url::parse("https://example.org/post").unwrap()));
    }

    #[test]
    fn non_http_schemes_are_never_in_scope() {
        let seed = Url::parse("https://docs.example.com/").unwrap();
        let guard = ScopeGuard::new(&seed, CrawlScope::Hostname);
        assert!(!guard.in_scope(&Url::parse("file:///etc/passwd").unwrap()));
    }

    #[test]
    fn normalize_strips_fragment_and_trailing_slash() {
        let url = Url::parse("https://docs.example.com/guide/intro/#section").unwrap();
        let normalized = normalize_url(&url);
        assert_eq!(normalized, "https://docs.example.com/guide/intro");
    }
}

//! Pipeline execution context threaded through the content-processing
//! middleware chain, and the chain's control-flow signal.

use docsforge_shared::ScrapeMode;

/// Signals whether the middleware chain should keep running or stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareFlow {
    Continue,
    Stop,
}

/// State carried through one page's pass through the processing pipeline.
///
/// Each stage (sanitize, render, convert, extract links) reads and updates
/// this in place; non-fatal failures are appended to `errors` rather than
/// aborting the page, mirroring the fetch-then-best-effort-process shape of
/// the crawl loop this pipeline feeds.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub source_url: String,
    pub title: Option<String>,
    pub scrape_mode: ScrapeMode,
    pub raw_html: String,
    pub content_html: String,
    pub markdown: String,
    pub links: Vec<String>,
    pub errors: Vec<String>,
    /// Caller-supplied CSS selectors to strip during sanitization, on top
    /// of the built-in chrome selectors.
    pub exclude_selectors: Vec<String>,
}

impl PipelineContext {
    pub fn new(source_url: impl Into<String>, raw_html: impl Into<String>, scrape_mode: ScrapeMode) -> Self {
        Self {
            source_url: source_url.into(),
            title: None,
            scrape_mode,
            raw_html: raw_html.into(),
            content_html: String::new(),
            markdown: String::new(),
            links: Vec::new(),
            errors: Vec::new(),
            exclude_selectors: Vec::new(),
        }
    }

    pub fn with_exclude_selectors(mut self, selectors: Vec<String>) -> Self {
        self.exclude_selectors = selectors;
        self
    }

    pub fn push_error(&mut self, stage: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{stage}({}): {message}", self.source_url));
    }
}

//! The crawl engine: a frontier-driven worker pool that turns a seed URL
//! and [`ScrapeOptions`](docsforge_shared::ScrapeOptions) into persisted
//! chunks, wiring together the fetch, pipeline, splitter, and embed
//! crates. Replaces the teacher's platform-adapter-based crawler (which
//! extracted content itself) with a frontier/scope/cancellation-driven
//! loop that delegates content extraction to [`docsforge_pipeline`].

mod engine;
mod frontier;
mod scope;

pub use engine::{CrawlEngine, CrawlOutcome};
pub use frontier::Frontier;
pub use scope::{normalize_url, ScopeGuard};

//! The workspace facade (spec §6): wires the manager, crawler, pipeline,
//! store, retriever, embedder, and fetcher set together behind the nine
//! operations external callers see. Analogous to the teacher's `core`
//! crate as an orchestration layer, though the teacher's `add_kb`
//! pipeline itself isn't reused — job/engine semantics here are new.

pub mod telemetry;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use docsforge_crawler::CrawlEngine;
use docsforge_embed::{DeterministicHashEmbedder, Embedder};
use docsforge_fetch::{FetchOptions, FetcherRegistry};
use docsforge_manager::Manager;
use docsforge_pipeline::{self as pipeline, NullRenderer, PipelineContext, Renderer};
use docsforge_shared::{
    normalize_library, ChunkSink, Error, Job, JobId, JobStatus, Result, ScrapeMode, ScrapeOptions,
    ScoredChunk,
};
use docsforge_splitter::SplitOptions;
use docsforge_store::Store;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

/// A library's name and the versions currently indexed for it.
#[derive(Debug, Clone)]
pub struct LibrarySummary {
    pub name: String,
    pub versions: Vec<String>,
}

/// Outcome of `scrape`: either a queued job id, or — when `wait` was set —
/// the job's final page count.
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Queued { job_id: JobId },
    Finished { job_id: JobId, pages_scraped: u32 },
}

pub struct Engine {
    store: Arc<Store>,
    manager: Arc<Manager>,
    fetchers: Arc<FetcherRegistry>,
    renderer: Arc<dyn Renderer>,
    embedder: Arc<dyn Embedder>,
}

impl Engine {
    /// Assemble an engine from its collaborators. Prefer [`Engine::open`]
    /// for the common case of wiring defaults around a database path.
    pub fn new(
        store: Arc<Store>,
        manager: Arc<Manager>,
        fetchers: Arc<FetcherRegistry>,
        renderer: Arc<dyn Renderer>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self { store, manager, fetchers, renderer, embedder }
    }

    /// Open (creating if absent) the store at `db_path` and wire a default
    /// stack around it: the full fetcher set, no headless renderer, and the
    /// deterministic hash embedder. `max_concurrency` bounds the manager's
    /// global job concurrency.
    pub async fn open(db_path: &Path, max_concurrency: usize) -> Result<Self> {
        let store = Arc::new(Store::open(db_path).await?);
        store.initialize().await?;

        let embedder: Arc<dyn Embedder> = Arc::new(DeterministicHashEmbedder::default());
        let renderer: Arc<dyn Renderer> = Arc::new(NullRenderer);
        let fetchers = Arc::new(FetcherRegistry::default());

        let crawl_engine = Arc::new(CrawlEngine::new(
            FetcherRegistry::default(),
            renderer.clone(),
            embedder.clone(),
            store.clone() as Arc<dyn ChunkSink>,
            SplitOptions::default(),
        ));

        let manager = Arc::new(Manager::new(store.clone(), crawl_engine, max_concurrency));

        Ok(Self { store, manager, fetchers, renderer, embedder })
    }

    /// Queue a scrape of `url` into `(library, version)`. Blocks until the
    /// job is terminal when `wait` is true.
    #[instrument(skip(self, options), fields(%library))]
    pub async fn scrape(
        &self,
        library: &str,
        version: Option<&str>,
        url: &str,
        options: ScrapeOptions,
        wait: bool,
    ) -> Result<ScrapeOutcome> {
        let outcome = self.manager.enqueue(library, version, url, options, wait).await?;
        match outcome.job {
            Some(job) => Ok(ScrapeOutcome::Finished {
                job_id: outcome.job_id,
                pages_scraped: job.progress.pages_processed,
            }),
            None => Ok(ScrapeOutcome::Queued { job_id: outcome.job_id }),
        }
    }

    /// Hybrid or exact-match search over an indexed `(library, version)`.
    #[instrument(skip(self), fields(%library, %query))]
    pub async fn search(
        &self,
        library: &str,
        version: Option<&str>,
        query: &str,
        limit: usize,
        exact_match: bool,
    ) -> Result<Vec<ScoredChunk>> {
        let request = docsforge_retriever::SearchRequest {
            library,
            version,
            query,
            limit,
            exact_match,
        };
        docsforge_retriever::search(&self.store, &self.embedder, request).await
    }

    /// Every indexed library and the versions available for it.
    pub async fn list_libraries(&self) -> Result<Vec<LibrarySummary>> {
        let map: HashMap<String, _> = self.store.query_library_versions().await?;
        let mut summaries: Vec<LibrarySummary> = map
            .into_iter()
            .map(|(name, versions)| LibrarySummary { name, versions: versions.into_iter().collect() })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Resolve the best indexed version for `library` against an optional
    /// target (absent, `"latest"`, exact semver, or X-range).
    pub async fn find_version(&self, library: &str, target_version: Option<&str>) -> Result<(Option<String>, bool)> {
        let normalized = normalize_library(library);
        let available = self.store.query_unique_versions(&normalized).await?;
        let has_unversioned = available.iter().any(|v| v.is_empty());
        let versioned: Vec<String> = available.into_iter().filter(|v| !v.is_empty()).collect();
        docsforge_retriever::find_best_version(&normalized, &versioned, has_unversioned, target_version)
    }

    pub async fn list_jobs(&self, status_filter: Option<JobStatus>) -> Result<Vec<Job>> {
        self.manager.list_jobs(status_filter).await
    }

    pub async fn get_job(&self, job_id: JobId) -> Result<Option<Job>> {
        self.manager.get_job(job_id).await
    }

    pub async fn cancel_job(&self, job_id: JobId) -> Result<(bool, String)> {
        self.manager.cancel_job(job_id).await
    }

    /// Abort any in-flight jobs for `(library, version)`, then delete its
    /// chunks. An absent `version` targets only the unversioned bucket.
    pub async fn remove(&self, library: &str, version: Option<&str>) -> Result<String> {
        let cancelled = self.manager.cancel_scope(library, version).await?;
        let removed = self.store.delete_scope(library, version.unwrap_or("")).await?;
        let version_label = version.unwrap_or("unversioned");
        Ok(format!(
            "removed {removed} chunk(s) for {library:?} ({version_label}); aborted {cancelled} in-flight job(s)"
        ))
    }

    /// Fetch a single URL and return it as Markdown, without persisting
    /// anything. Used for ad-hoc lookups outside of a scrape job.
    #[instrument(skip(self))]
    pub async fn fetch_url(&self, url: &str, follow_redirects: bool) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| Error::validation(format!("invalid url: {e}")))?;
        let fetcher = self
            .fetchers
            .dispatch(&parsed)
            .ok_or_else(|| Error::fetch_failed(url, "no fetcher registered for this URL", false))?;

        let options = FetchOptions {
            follow_redirects,
            headers: HashMap::new(),
            cancel: CancellationToken::new(),
        };
        let fetched = fetcher.fetch(&parsed, &options).await?;

        let raw_content = String::from_utf8_lossy(&fetched.bytes).into_owned();
        let mut ctx = PipelineContext::new(&fetched.source_url, &raw_content, ScrapeMode::Fetch);
        pipeline::process(&mut ctx, self.renderer.as_ref(), &fetched.mime_type).await?;

        Ok(ctx.markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn test_engine() -> (tempfile::TempDir, Engine) {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&dir.path().join("engine.db"), 2).await.unwrap();
        (dir, engine)
    }

    fn write_fixture(dir: &std::path::Path, body: &str) -> String {
        let path = dir.path().join("seed.html");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{body}").unwrap();
        format!("file://{}", path.display())
    }

    #[tokio::test]
    async fn fetch_url_returns_markdown_for_a_local_file() {
        let (dir, engine) = test_engine().await;
        let seed = write_fixture(&dir, "<html><body><h1>Hi</h1><p>hello there</p></body></html>");
        let markdown = engine.fetch_url(&seed, true).await.unwrap();
        assert!(markdown.contains("hello there"));
    }

    #[tokio::test]
    async fn list_libraries_is_empty_for_a_fresh_store() {
        let (_dir, engine) = test_engine().await;
        let libraries = engine.list_libraries().await.unwrap();
        assert!(libraries.is_empty());
    }

    #[tokio::test]
    async fn find_version_on_unindexed_library_errors() {
        let (_dir, engine) = test_engine().await;
        let err = engine.find_version("nope", None).await.unwrap_err();
        assert_eq!(err.kind_name(), "VersionNotFound");
    }

    #[tokio::test]
    async fn scrape_with_wait_persists_chunks_queryable_via_search() {
        let (dir, engine) = test_engine().await;
        let seed = write_fixture(&dir, "<html><body><h1>Guide</h1><p>install the cli tool here</p></body></html>");

        let outcome = engine
            .scrape("react", None, &seed, ScrapeOptions { max_pages: 1, ..Default::default() }, true)
            .await
            .unwrap();

        match outcome {
            ScrapeOutcome::Finished { pages_scraped, .. } => assert_eq!(pages_scraped, 1),
            ScrapeOutcome::Queued { .. } => panic!("expected a finished outcome when waiting"),
        }

        let libraries = engine.list_libraries().await.unwrap();
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].name, "react");

        let results = engine.search("react", None, "install cli", 5, false).await.unwrap();
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_chunks_for_scope() {
        let (dir, engine) = test_engine().await;
        let seed = write_fixture(&dir, "<html><body><h1>Guide</h1><p>content</p></body></html>");
        engine
            .scrape("react", None, &seed, ScrapeOptions { max_pages: 1, ..Default::default() }, true)
            .await
            .unwrap();

        engine.remove("react", None).await.unwrap();
        assert!(engine.list_libraries().await.unwrap().is_empty());
    }
}

//! The crawl worker pool: drains the frontier in concurrency-bounded
//! batches, spawning one task per page. Each task runs fetch -> content
//! pipeline -> split -> embed -> persist, checking the cancellation token
//! between every stage. Generalizes the teacher's `Crawler::crawl`
//! batch-drain-then-spawn loop from a fixed HTML-adapter pipeline to the
//! new fetch/pipeline/splitter/store stack.

use std::collections::BTreeSet;
use std::sync::Arc;

use base64::Engine as _;
use docsforge_embed::Embedder;
use docsforge_fetch::{FetchOptions, FetcherRegistry};
use docsforge_pipeline::{self as pipeline, Credentials, PipelineContext, Renderer};
use docsforge_shared::{Chunk, ChunkSink, Error, Job, JobProgress, Result};
use docsforge_splitter::{self as splitter, SplitOptions};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};
use url::Url;

use crate::scope::ScopeGuard;
use crate::Frontier;

/// Collaborators a crawl needs. Held behind `Arc` so each spawned worker
/// task can clone a cheap handle.
pub struct CrawlEngine {
    fetchers: Arc<FetcherRegistry>,
    renderer: Arc<dyn Renderer>,
    embedder: Arc<dyn Embedder>,
    sink: Arc<dyn ChunkSink>,
    split_options: SplitOptions,
}

/// Totals produced by a completed (or cancelled) crawl.
#[derive(Debug, Default, Clone)]
pub struct CrawlOutcome {
    pub pages_processed: u32,
    pub pages_persisted_chunks: u64,
    pub pages_failed: u32,
    pub cancelled: bool,
}

enum PageOutcome {
    Processed { chunks_persisted: u64, links: Vec<(String, u32)> },
    Failed(Error),
    Cancelled,
}

impl CrawlEngine {
    pub fn new(
        fetchers: FetcherRegistry,
        renderer: Arc<dyn Renderer>,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn ChunkSink>,
        split_options: SplitOptions,
    ) -> Self {
        Self {
            fetchers: Arc::new(fetchers),
            renderer,
            embedder,
            sink,
            split_options,
        }
    }

    /// Run the crawl described by `job`, updating `progress` after every
    /// batch and observing `cancel`. Returns once the frontier is drained,
    /// `max_pages` is reached, or cancellation is observed.
    #[instrument(skip(self, progress, cancel), fields(job_id = %job.id, library = %job.library))]
    pub async fn crawl(&self, job: &Job, progress: Arc<RwLock<JobProgress>>, cancel: CancellationToken) -> Result<CrawlOutcome> {
        let seed = Url::parse(&job.seed_url).map_err(|e| Error::validation(format!("invalid seed url: {e}")))?;
        let scope_guard = ScopeGuard::new(&seed, job.options.scope);
        let seed_credentials = pipeline::extract_credentials(&seed);

        let mut frontier = Frontier::new(&seed);
        let semaphore = Arc::new(Semaphore::new(job.options.max_concurrency.max(1) as usize));
        let mut outcome = CrawlOutcome::default();

        while !frontier.is_empty() {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let pages_in_flight = outcome.pages_processed + outcome.pages_failed;
            if pages_in_flight >= job.options.max_pages {
                break;
            }
            let remaining_budget = (job.options.max_pages - pages_in_flight) as usize;
            let batch_size = remaining_budget.min(job.options.max_concurrency.max(1) as usize);
            let batch = frontier.drain_batch(batch_size);
            if batch.is_empty() {
                break;
            }

            let mut handles = Vec::with_capacity(batch.len());
            for entry in batch {
                let semaphore = semaphore.clone();
                let fetchers = self.fetchers.clone();
                let renderer = self.renderer.clone();
                let embedder = self.embedder.clone();
                let sink = self.sink.clone();
                let split_options = self.split_options;
                let cancel = cancel.clone();
                let headers = job.options.headers.clone();
                let library = job.library.clone();
                let version = job.version.clone();
                let follow_redirects = job.options.follow_redirects;
                let scrape_mode = job.options.scrape_mode;
                let seed_credentials = seed_credentials.clone();
                let exclude_selectors = job.options.exclude_selectors.clone();

                handles.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    process_page(
                        entry.url,
                        entry.depth,
                        &fetchers,
                        renderer.as_ref(),
                        embedder.as_ref(),
                        sink.as_ref(),
                        split_options,
                        &library,
                        &version,
                        headers,
                        follow_redirects,
                        scrape_mode,
                        seed_credentials,
                        exclude_selectors,
                        cancel,
                    )
                    .await
                }));
            }

            for handle in handles {
                let page_outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => PageOutcome::Failed(Error::processing_failed("<task>", join_err.to_string())),
                };

                match page_outcome {
                    PageOutcome::Cancelled => {
                        outcome.cancelled = true;
                    }
                    PageOutcome::Processed { chunks_persisted, links } => {
                        outcome.pages_processed += 1;
                        outcome.pages_persisted_chunks += chunks_persisted;

                        for (link, depth) in links {
                            if depth > job.options.max_depth {
                                continue;
                            }
                            let Ok(candidate) = Url::parse(&link) else { continue };
                            if !scope_guard.in_scope(&candidate) {
                                continue;
                            }
                            frontier.try_admit(&candidate, depth, &job.seed_url);
                        }
                    }
                    PageOutcome::Failed(err) => {
                        outcome.pages_failed += 1;
                        if job.options.ignore_errors {
                            warn!(error = %err, "page processing failed, continuing crawl");
                        } else {
                            return Err(err);
                        }
                    }
                }
            }

            let mut guard = progress.write().await;
            guard.pages_processed = outcome.pages_processed;
            guard.pages_persisted_chunks = outcome.pages_persisted_chunks;
            guard.pages_failed = outcome.pages_failed;
            drop(guard);
        }

        if cancel.is_cancelled() {
            outcome.cancelled = true;
        }

        Ok(outcome)
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_page(
    url: String,
    depth: u32,
    fetchers: &FetcherRegistry,
    renderer: &dyn Renderer,
    embedder: &dyn Embedder,
    sink: &dyn ChunkSink,
    split_options: SplitOptions,
    library: &str,
    version: &str,
    mut headers: std::collections::HashMap<String, String>,
    follow_redirects: bool,
    scrape_mode: docsforge_shared::ScrapeMode,
    seed_credentials: Option<Credentials>,
    exclude_selectors: Vec<String>,
    cancel: CancellationToken,
) -> PageOutcome {
    let parsed = match Url::parse(&url) {
        Ok(u) => u,
        Err(e) => return PageOutcome::Failed(Error::fetch_failed(&url, e.to_string(), false)),
    };

    if let Some(creds) = &seed_credentials {
        let has_auth = headers.keys().any(|k| k.eq_ignore_ascii_case("authorization"));
        if pipeline::should_attach_auth(creds, &parsed, has_auth) {
            let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", creds.username, creds.password));
            headers.insert("Authorization".to_string(), format!("Basic {token}"));
        }
    }

    let fetcher = match fetchers.dispatch(&parsed) {
        Some(f) => f,
        None => return PageOutcome::Failed(Error::fetch_failed(&url, "no fetcher registered for this URL", false)),
    };

    let fetch_options = FetchOptions {
        follow_redirects,
        headers,
        cancel: cancel.clone(),
    };

    let fetched = match fetcher.fetch(&parsed, &fetch_options).await {
        Ok(f) => f,
        Err(e) => return PageOutcome::Failed(e),
    };

    if cancel.is_cancelled() {
        return PageOutcome::Cancelled;
    }

    let raw_content = String::from_utf8_lossy(&fetched.bytes).into_owned();
    let mut ctx = PipelineContext::new(&fetched.source_url, &raw_content, scrape_mode)
        .with_exclude_selectors(exclude_selectors);

    if let Err(e) = pipeline::process(&mut ctx, renderer, &fetched.mime_type).await {
        return PageOutcome::Failed(e);
    }

    if cancel.is_cancelled() {
        return PageOutcome::Cancelled;
    }

    let title = ctx.title.clone().unwrap_or_else(|| "Untitled".to_string());
    let links: Vec<(String, u32)> = ctx.links.iter().map(|l| (l.clone(), depth + 1)).collect();

    let split_chunks = splitter::split(&ctx.markdown, split_options);
    if split_chunks.is_empty() {
        return PageOutcome::Processed { chunks_persisted: 0, links };
    }

    if cancel.is_cancelled() {
        return PageOutcome::Cancelled;
    }

    let texts: Vec<String> = split_chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = match embedder.embed(&texts).await {
        Ok(e) => e,
        Err(e) => return PageOutcome::Failed(e),
    };

    let chunks: Vec<Chunk> = split_chunks
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(idx, (chunk, embedding))| Chunk {
            content: chunk.content,
            types: chunk.types.into_iter().collect::<BTreeSet<_>>(),
            section: chunk.section,
            source_url: fetched.source_url.clone(),
            title: title.clone(),
            library: library.to_string(),
            version: version.to_string(),
            embedding,
            chunk_index: idx as u32,
        })
        .collect();

    if cancel.is_cancelled() {
        return PageOutcome::Cancelled;
    }

    match sink.add_chunks(library, version, chunks).await {
        Ok(count) => PageOutcome::Processed { chunks_persisted: count, links },
        Err(e) => PageOutcome::Failed(e),
    }
}

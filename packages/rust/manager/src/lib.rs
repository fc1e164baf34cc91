//! The pipeline manager (spec §4.E): a job registry and scheduler sitting
//! in front of [`docsforge_crawler::CrawlEngine`]. Generalizes the
//! teacher's per-crawl semaphore (the old `Crawler::crawl`'s
//! `Semaphore::new(max_concurrency)`) into one held for the manager's
//! whole lifetime, so every enqueued job queues behind a single global
//! concurrency limit instead of each crawl call getting its own pool.

mod job;

use std::collections::HashMap;
use std::sync::Arc;

use docsforge_crawler::CrawlEngine;
use docsforge_shared::{
    normalize_library, normalize_version, Clock, Error, Job, JobId, JobStatus, Result,
    ScrapeOptions, SystemClock,
};
use docsforge_store::Store;
use job::JobHandle;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, instrument, warn};

/// What `enqueue` returns: the new job's id, plus its final record when the
/// caller asked to wait for completion.
#[derive(Debug, Clone)]
pub struct EnqueueOutcome {
    pub job_id: JobId,
    pub job: Option<Job>,
}

pub struct Manager {
    store: Arc<Store>,
    engine: Arc<CrawlEngine>,
    clock: Arc<dyn Clock>,
    semaphore: Arc<Semaphore>,
    registry: Arc<RwLock<HashMap<JobId, Arc<JobHandle>>>>,
}

impl Manager {
    pub fn new(store: Arc<Store>, engine: Arc<CrawlEngine>, max_concurrency: usize) -> Self {
        Self::with_clock(store, engine, max_concurrency, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<Store>,
        engine: Arc<CrawlEngine>,
        max_concurrency: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            engine,
            clock,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Queue a scrape job. When `wait` is true, suspends until the job
    /// reaches a terminal state and returns its final record.
    #[instrument(skip(self, options), fields(%library))]
    pub async fn enqueue(
        &self,
        library: &str,
        version: Option<&str>,
        seed_url: &str,
        options: ScrapeOptions,
        wait: bool,
    ) -> Result<EnqueueOutcome> {
        options.validate()?;

        let job = Job::new(
            normalize_library(library),
            normalize_version(version),
            seed_url.to_string(),
            options,
            self.clock.now(),
        );
        self.store.insert_job(&job).await?;
        info!(job_id = %job.id, seed_url = %job.seed_url, "job enqueued");

        let handle = Arc::new(JobHandle::new());
        self.registry.write().await.insert(job.id, handle.clone());

        let notified = handle.notify.notified();
        let job_id = job.id;

        tokio::spawn(run_job(
            self.store.clone(),
            self.engine.clone(),
            self.semaphore.clone(),
            handle,
            job,
        ));

        if wait {
            notified.await;
            let finished = self.store.get_job(job_id).await?;
            return Ok(EnqueueOutcome { job_id, job: finished });
        }

        Ok(EnqueueOutcome { job_id, job: None })
    }

    /// Fetch a job's record, merging in live progress counters when the job
    /// is still running in this process.
    pub async fn get_job(&self, job_id: JobId) -> Result<Option<Job>> {
        let Some(mut job) = self.store.get_job(job_id).await? else {
            return Ok(None);
        };
        self.overlay_live_progress(&mut job).await;
        Ok(Some(job))
    }

    /// List jobs, optionally filtered by status, ordered by `created_at`.
    pub async fn list_jobs(&self, status_filter: Option<JobStatus>) -> Result<Vec<Job>> {
        let mut jobs = self.store.list_jobs(status_filter).await?;
        for job in jobs.iter_mut() {
            self.overlay_live_progress(job).await;
        }
        Ok(jobs)
    }

    /// Jobs matching a `(library, version)` scope, optionally filtered by
    /// status.
    pub async fn find_by_lib_version(
        &self,
        library: &str,
        version: Option<&str>,
        status_filter: Option<JobStatus>,
    ) -> Result<Vec<Job>> {
        let library = normalize_library(library);
        let version = normalize_version(version);
        let jobs = self.list_jobs(status_filter).await?;
        Ok(jobs
            .into_iter()
            .filter(|j| j.library == library && j.version == version)
            .collect())
    }

    /// Request cancellation of a job. Idempotent: cancelling an already
    /// terminal job returns `success=false` with an explanatory message
    /// rather than an error. For a `Running` job, suspends until the worker
    /// acknowledges the `Running -> Cancelling` transition at its next
    /// checkpoint (but not until the job actually terminates); a `Queued`
    /// job has no worker to wait on, so the manager performs the direct
    /// `Queued -> Cancelled` transition itself.
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, job_id: JobId) -> Result<(bool, String)> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::job_not_found(job_id.to_string()))?;

        if job.status.is_terminal() {
            return Ok((false, format!("job already {:?}", job.status).to_lowercase()));
        }

        let handle = match self.registry.read().await.get(&job_id).cloned() {
            Some(handle) => handle,
            None => return Ok((false, "job is not tracked in this process".to_string())),
        };

        if job.status == JobStatus::Cancelling {
            return Ok((true, "cancellation already in progress".to_string()));
        }

        if job.status == JobStatus::Queued {
            let mut job = job;
            job.status = JobStatus::Cancelled;
            job.finished_at = Some(self.clock.now());
            handle.cancel.cancel();
            self.store.update_job(&job).await?;
            handle.notify.notify_waiters();
            return Ok((true, "cancellation requested".to_string()));
        }

        // Running: capture both Notified futures before signaling so neither
        // wakeup can be missed. Race the worker's cancelling-ack against its
        // terminal notify, since the job may finish naturally before the
        // worker ever reaches a cancellation checkpoint.
        let acked = handle.cancel_acked.notified();
        let terminal = handle.notify.notified();
        handle.cancel.cancel();

        tokio::select! {
            _ = acked => {}
            _ = terminal => {}
        }

        Ok((true, "cancellation requested".to_string()))
    }

    /// Suspend until `job_id` reaches a terminal state, then return its
    /// final record.
    pub async fn wait_for_job(&self, job_id: JobId) -> Result<Job> {
        loop {
            let handle = self.registry.read().await.get(&job_id).cloned();
            let notified = handle.as_ref().map(|h| h.notify.notified());

            let job = self
                .store
                .get_job(job_id)
                .await?
                .ok_or_else(|| Error::job_not_found(job_id.to_string()))?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            match notified {
                Some(notified) => notified.await,
                None => return Ok(job),
            }
        }
    }

    /// Remove every terminal job record, pruning their in-process handles
    /// too. Returns the number of records removed.
    pub async fn clear_completed(&self) -> Result<u64> {
        let terminal_ids: Vec<JobId> = self
            .store
            .list_jobs(None)
            .await?
            .into_iter()
            .filter(|j| j.status.is_terminal())
            .map(|j| j.id)
            .collect();

        let removed = self.store.clear_completed_jobs().await?;

        let mut registry = self.registry.write().await;
        for id in terminal_ids {
            registry.remove(&id);
        }

        Ok(removed)
    }

    /// Cancel every non-terminal job scoped to `(library, version)`. Used
    /// by the `remove` operation, which must abort in-flight jobs before
    /// deleting a scope's chunks.
    pub async fn cancel_scope(&self, library: &str, version: Option<&str>) -> Result<usize> {
        let matching = self.find_by_lib_version(library, version, None).await?;
        let mut cancelled = 0usize;
        for job in matching.into_iter().filter(|j| !j.status.is_terminal()) {
            if self.cancel_job(job.id).await?.0 {
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn overlay_live_progress(&self, job: &mut Job) {
        if job.status.is_terminal() {
            return;
        }
        if let Some(handle) = self.registry.read().await.get(&job.id).cloned() {
            job.progress = handle.progress.read().await.clone();
        }
    }
}

/// The body of a single scheduled job: acquire a concurrency slot, run the
/// crawl, persist the outcome, and wake any waiters.
#[instrument(skip(store, engine, semaphore, handle, job), fields(job_id = %job.id))]
async fn run_job(
    store: Arc<Store>,
    engine: Arc<CrawlEngine>,
    semaphore: Arc<Semaphore>,
    handle: Arc<JobHandle>,
    mut job: Job,
) {
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return;
    };

    if handle.cancel.is_cancelled() {
        job.status = JobStatus::Cancelled;
        job.finished_at = Some(chrono::Utc::now());
        let _ = store.update_job(&job).await;
        handle.notify.notify_waiters();
        return;
    }

    job.status = JobStatus::Running;
    job.started_at = Some(chrono::Utc::now());
    if let Err(e) = store.update_job(&job).await {
        warn!(error = %e, "failed to persist job transition to running");
    }

    let crawl_fut = engine.crawl(&job, handle.progress.clone(), handle.cancel.clone());
    tokio::pin!(crawl_fut);

    // Race the crawl against the cancellation signal so a cancelling job's
    // `Running -> Cancelling` transition is observed and persisted as soon
    // as it's requested, not only once the crawl itself winds down at its
    // own cooperative checkpoints.
    let outcome = tokio::select! {
        _ = handle.cancel.cancelled() => {
            job.status = JobStatus::Cancelling;
            if let Err(e) = store.update_job(&job).await {
                warn!(error = %e, "failed to persist job transition to cancelling");
            }
            handle.cancel_acked.notify_waiters();
            crawl_fut.await
        }
        result = &mut crawl_fut => result,
    };
    job.finished_at = Some(chrono::Utc::now());

    match outcome {
        Ok(result) => {
            job.progress.pages_processed = result.pages_processed;
            job.progress.pages_persisted_chunks = result.pages_persisted_chunks;
            job.progress.pages_failed = result.pages_failed;
            job.status = if result.cancelled { JobStatus::Cancelled } else { JobStatus::Completed };
            info!(
                pages = result.pages_processed,
                chunks = result.pages_persisted_chunks,
                cancelled = result.cancelled,
                "job finished"
            );
        }
        Err(e) => {
            job.status = JobStatus::Failed;
            job.error = Some(e.to_string());
            warn!(error = %e, "job failed");
        }
    }

    if let Err(e) = store.update_job(&job).await {
        warn!(error = %e, "failed to persist final job state");
    }

    handle.notify.notify_waiters();
}

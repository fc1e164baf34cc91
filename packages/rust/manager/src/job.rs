//! Manager-internal bookkeeping for a single in-flight job. None of this is
//! persisted — it exists only for the lifetime of the process and is
//! discarded once a job's terminal record is cleared.

use std::sync::Arc;

use docsforge_shared::JobProgress;
use tokio::sync::{Notify, RwLock};
use tokio_util::sync::CancellationToken;

pub(crate) struct JobHandle {
    pub(crate) cancel: CancellationToken,
    /// Fires once per terminal transition (`Completed`/`Failed`/`Cancelled`).
    pub(crate) notify: Notify,
    /// Fires once the worker has observed cancellation and persisted the
    /// `Running -> Cancelling` transition — distinct from `notify` since
    /// `cancel_job` must suspend until this, but not until the job
    /// actually terminates.
    pub(crate) cancel_acked: Notify,
    pub(crate) progress: Arc<RwLock<JobProgress>>,
}

impl JobHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            notify: Notify::new(),
            cancel_acked: Notify::new(),
            progress: Arc::new(RwLock::new(JobProgress::default())),
        }
    }
}

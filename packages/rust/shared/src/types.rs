//! Domain types shared across the docsforge workspace: chunks, documents,
//! jobs, and the option structs controlling a scrape.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique id for a crawl job.
pub type JobId = Uuid;

pub fn new_job_id() -> JobId {
    Uuid::now_v7()
}

/// One of the structural kinds a chunk's source block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Heading,
    Text,
    Code,
    Table,
}

/// Where a chunk sits in the document's heading hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPath {
    /// 0 when the chunk precedes any heading; otherwise the depth of the
    /// deepest enclosing heading (1..=6).
    pub level: u8,
    /// Heading titles from the document root down to `level`.
    pub path: Vec<String>,
}

impl SectionPath {
    pub fn root() -> Self {
        Self {
            level: 0,
            path: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.level <= 6 && (self.level == 0 || self.path.len() == self.level as usize)
    }
}

/// A conceptual page handed to the store by the content pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source_url: String,
    pub title: String,
    pub markdown_body: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Document {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(crate::error::Error::validation(
                "document source_url must not be empty",
            ));
        }
        if self.markdown_body.trim().is_empty() {
            return Err(crate::error::Error::validation(
                "document markdown_body must not be empty",
            ));
        }
        Ok(())
    }
}

/// The unit of storage: a bounded piece of Markdown with structural metadata
/// and an embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub types: BTreeSet<ChunkType>,
    pub section: SectionPath,
    pub source_url: String,
    pub title: String,
    pub library: String,
    pub version: String,
    pub embedding: Vec<f32>,
    pub chunk_index: u32,
}

impl Chunk {
    pub fn is_valid(&self) -> bool {
        self.section.is_valid() && !self.types.is_empty()
    }
}

/// A chunk as returned from retrieval, carrying its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub url: String,
    pub content: String,
    pub score: f32,
    pub title: String,
    pub library: String,
    pub version: String,
    pub section_path: Vec<String>,
    pub section_level: u8,
}

/// Crawl boundary relative to the seed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlScope {
    #[default]
    Subpages,
    Hostname,
    Domain,
}

/// Whether/when to render pages through a headless browser before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMode {
    Fetch,
    Playwright,
    #[default]
    Auto,
}

/// Caller-tunable options for a single scrape job. Every field has a
/// spec-mandated default so `ScrapeOptions::default()` is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    pub max_pages: u32,
    pub max_depth: u32,
    pub max_concurrency: u32,
    pub scope: CrawlScope,
    pub scrape_mode: ScrapeMode,
    pub follow_redirects: bool,
    pub ignore_errors: bool,
    pub headers: std::collections::HashMap<String, String>,
    /// Extra CSS selectors to strip during sanitization, on top of the
    /// built-in chrome selectors (nav, ads, modals, etc.).
    pub exclude_selectors: Vec<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            max_depth: 3,
            max_concurrency: 3,
            scope: CrawlScope::default(),
            scrape_mode: ScrapeMode::default(),
            follow_redirects: true,
            ignore_errors: true,
            headers: std::collections::HashMap::new(),
            exclude_selectors: Vec::new(),
        }
    }
}

impl ScrapeOptions {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_pages < 1 {
            return Err(crate::error::Error::validation("max_pages must be >= 1"));
        }
        if self.max_concurrency < 1 {
            return Err(crate::error::Error::validation(
                "max_concurrency must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Lifecycle state of a job. Transitions are constrained by
/// [`JobStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelling,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Queued, Running)
                | (Queued, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelling)
                | (Cancelling, Cancelled)
        )
    }
}

/// Progress counters updated by crawl workers as a job runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProgress {
    pub pages_processed: u32,
    pub pages_persisted_chunks: u64,
    pub pages_failed: u32,
}

/// The externally-visible record for a job. Does not carry the internal
/// cancellation token or completion signal — those are manager-internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub library: String,
    pub version: String,
    pub seed_url: String,
    pub options: ScrapeOptions,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub progress: JobProgress,
}

impl Job {
    pub fn new(library: String, version: String, seed_url: String, options: ScrapeOptions, now: DateTime<Utc>) -> Self {
        Self {
            id: new_job_id(),
            library,
            version,
            seed_url,
            options,
            status: JobStatus::Queued,
            created_at: now,
            started_at: None,
            finished_at: None,
            error: None,
            progress: JobProgress::default(),
        }
    }
}

/// A URL pending processing within a single job's frontier.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
    pub parent_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_path_validity() {
        assert!(SectionPath::root().is_valid());
        assert!(SectionPath {
            level: 2,
            path: vec!["Guide".into(), "Install".into()],
        }
        .is_valid());
        assert!(!SectionPath {
            level: 2,
            path: vec!["Guide".into()],
        }
        .is_valid());
        assert!(!SectionPath {
            level: 7,
            path: vec![],
        }
        .is_valid());
    }

    #[test]
    fn job_status_transitions() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Cancelling));
        assert!(JobStatus::Cancelling.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Queued));
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Cancelling.is_terminal());
    }

    #[test]
    fn document_validation_rejects_empty_fields() {
        let doc = Document {
            source_url: "".into(),
            title: "t".into(),
            markdown_body: "body".into(),
            metadata: serde_json::Value::Null,
        };
        assert!(doc.validate().is_err());

        let doc = Document {
            source_url: "https://example.com".into(),
            title: "t".into(),
            markdown_body: "   ".into(),
            metadata: serde_json::Value::Null,
        };
        assert!(doc.validate().is_err());
    }

    #[test]
    fn default_scrape_options_match_spec_ranges() {
        let opts = ScrapeOptions::default();
        assert_eq!(opts.max_pages, 1000);
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.max_concurrency, 3);
        assert_eq!(opts.scope, CrawlScope::Subpages);
        assert_eq!(opts.scrape_mode, ScrapeMode::Auto);
        assert!(opts.follow_redirects);
        assert!(opts.ignore_errors);
        assert!(opts.validate().is_ok());
    }
}

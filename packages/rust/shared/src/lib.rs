//! Shared types, error model, clock, and version-normalization helpers for
//! docsforge.
//!
//! This crate is the foundation depended on by all other docsforge crates.
//! It provides:
//! - [`Error`] — the unified error type
//! - Domain types ([`Chunk`], [`Document`], [`Job`], [`ScrapeOptions`])
//! - [`Clock`] — the injectable time source
//! - Library/version normalization ([`version`])

pub mod clock;
pub mod error;
pub mod sink;
pub mod types;
pub mod version;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use sink::ChunkSink;
pub use types::{
    Chunk, ChunkType, CrawlScope, Document, FrontierEntry, Job, JobId, JobProgress, JobStatus,
    ScrapeMode, ScrapeOptions, ScoredChunk, SectionPath, new_job_id,
};
pub use version::{is_unversioned, normalize_library, normalize_version, parse_semver};

/// The `(library, version)` pair addressing a set of chunks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub library: String,
    pub version: String,
}

impl Scope {
    pub fn new(library: &str, version: Option<&str>) -> Self {
        Self {
            library: normalize_library(library),
            version: normalize_version(version),
        }
    }
}

//! Error types for docsforge.
//!
//! Library crates use [`Error`] via `thiserror`; there is no separate
//! "public" error type — the kinds surfaced to external callers
//! (`LibraryNotFound`, `VersionNotFound`, ...) are variants of this same enum.

use std::path::PathBuf;

/// Top-level error type for all docsforge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No chunks are indexed for the given library name.
    #[error("library not found: {library}")]
    LibraryNotFound {
        library: String,
        suggestions: Vec<String>,
    },

    /// The library is known but no version satisfies the request.
    #[error("version not found for {library}: {target:?}")]
    VersionNotFound {
        library: String,
        target: Option<String>,
        available_versions: Vec<String>,
    },

    /// No job exists with the given id.
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    /// A 3xx response was received while `follow_redirects=false`.
    #[error("redirect encountered: {original} -> {target} ({status})")]
    RedirectEncountered {
        original: String,
        target: String,
        status: u16,
    },

    /// A fetch exhausted its retry budget or failed non-retryably.
    #[error("fetch failed for {url}: {message}")]
    FetchFailed {
        url: String,
        message: String,
        retryable: bool,
    },

    /// Content-pipeline processing failed for a page.
    #[error("processing failed for {url}: {message}")]
    ProcessingFailed { url: String, message: String },

    /// Caller-supplied input failed validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Persistence-layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// HTML-to-Markdown (or Markdown-to-HTML) conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Embedding-provider error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Network/transport error not otherwise classified.
    #[error("network error: {0}")]
    Network(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn library_not_found(library: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::LibraryNotFound {
            library: library.into(),
            suggestions,
        }
    }

    pub fn version_not_found(
        library: impl Into<String>,
        target: Option<String>,
        available_versions: Vec<String>,
    ) -> Self {
        Self::VersionNotFound {
            library: library.into(),
            target,
            available_versions,
        }
    }

    pub fn job_not_found(job_id: impl Into<String>) -> Self {
        Self::JobNotFound {
            job_id: job_id.into(),
        }
    }

    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
            retryable,
        }
    }

    pub fn processing_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessingFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable kind name, for surfacing to external callers.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::LibraryNotFound { .. } => "LibraryNotFound",
            Self::VersionNotFound { .. } => "VersionNotFound",
            Self::JobNotFound { .. } => "JobNotFound",
            Self::RedirectEncountered { .. } => "RedirectEncountered",
            Self::FetchFailed { .. } => "FetchFailed",
            Self::ProcessingFailed { .. } => "ProcessingFailed",
            Self::Validation { .. } => "ValidationError",
            Self::Storage(_) => "StorageError",
            Self::Conversion(_) => "ConversionError",
            Self::Embedding(_) => "EmbeddingError",
            Self::Io { .. } => "IoError",
            Self::Network(_) => "NetworkError",
        }
    }

    /// Whether the operation that produced this error may succeed if retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { retryable: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = Error::validation("schema_version 99 not supported");
        assert!(err.to_string().contains("schema_version 99"));

        let err = Error::library_not_found("reactt", vec!["react".into()]);
        assert_eq!(err.kind_name(), "LibraryNotFound");
    }

    #[test]
    fn fetch_failed_preserves_retryable_flag() {
        let err = Error::fetch_failed("https://example.com", "timeout", true);
        assert!(err.is_retryable());

        let err = Error::fetch_failed("https://example.com", "404", false);
        assert!(!err.is_retryable());
    }

    #[test]
    fn redirect_encountered_is_never_retryable() {
        let err = Error::RedirectEncountered {
            original: "https://example.com/".into(),
            target: "https://new.example.com/".into(),
            status: 301,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind_name(), "RedirectEncountered");
    }
}

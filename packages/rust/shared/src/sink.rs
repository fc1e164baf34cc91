//! The store-facing interface the crawler writes chunks through. Kept here,
//! rather than in a downstream crate, so the crawler can depend on the
//! interface without depending on a concrete store implementation.

use async_trait::async_trait;

use crate::{Chunk, Result};

/// Persists chunks produced by the content pipeline. Implemented by the
/// document store; consumed by the crawler's worker pool.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Persist `chunks` for `(library, version)`, atomically. The sink
    /// assigns the final `chunk_index` per `source_url`, continuing from
    /// any prior chunks already stored for that URL; the `chunk_index`
    /// carried on each input `Chunk` is ignored. Returns the number of
    /// chunks written.
    async fn add_chunks(&self, library: &str, version: &str, chunks: Vec<Chunk>) -> Result<u64>;
}

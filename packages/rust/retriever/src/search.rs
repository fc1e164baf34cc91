//! Hybrid search orchestration (spec §4.G): resolve the version, embed the
//! query, recall candidates by vector similarity, re-rank lexically, and
//! truncate to the requested limit. An `exact_match` query skips vector
//! recall and re-ranking entirely in favor of a direct FTS5 lookup.

use std::sync::Arc;

use docsforge_embed::Embedder;
use docsforge_shared::{normalize_library, normalize_version, Error, Result, ScoredChunk};
use docsforge_store::Store;
use tracing::instrument;

use crate::bm25;
use crate::version::find_best_version;

/// Default multiple of `limit` requested from vector recall before
/// re-ranking narrows back down (spec §4.G step 3: "requesting >= limit
/// candidates (policy: 2*limit)").
const RECALL_MULTIPLIER: usize = 2;

pub struct SearchRequest<'a> {
    pub library: &'a str,
    pub version: Option<&'a str>,
    pub query: &'a str,
    pub limit: usize,
    pub exact_match: bool,
}

#[instrument(skip(store, embedder, request), fields(library = %request.library, query = %request.query))]
pub async fn search(
    store: &Store,
    embedder: &Arc<dyn Embedder>,
    request: SearchRequest<'_>,
) -> Result<Vec<ScoredChunk>> {
    let library = normalize_library(request.library);
    let available = store.query_unique_versions(&library).await?;
    let has_unversioned = available.iter().any(|v| v.is_empty());
    let versioned: Vec<String> = available.into_iter().filter(|v| !v.is_empty()).collect();

    if versioned.is_empty() && !has_unversioned {
        return Err(Error::library_not_found(library, Vec::new()));
    }

    let (resolved, _has_unversioned) =
        find_best_version(&library, &versioned, has_unversioned, request.version)?;
    let version = normalize_version(resolved.as_deref());

    if request.limit == 0 {
        return Ok(Vec::new());
    }

    if request.exact_match {
        let hits = store
            .lexical_search(&library, &version, request.query, request.limit as u32)
            .await?;
        return Ok(hits
            .into_iter()
            .map(|h| ScoredChunk {
                url: h.source_url,
                content: h.content,
                score: h.score,
                title: h.title,
                library: library.clone(),
                version: version.clone(),
                section_path: h.section_path,
                section_level: h.section_level,
            })
            .collect());
    }

    let query_vector = embedder
        .embed(&[request.query.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::embedding("empty embedding batch result for query"))?;

    let recall_k = request.limit * RECALL_MULTIPLIER;
    let candidates = store.vector_search(&library, &version, &query_vector, recall_k).await?;

    Ok(bm25::rerank(candidates, request.query, request.limit))
}

//! Version resolution and hybrid search over a document store: picks the
//! best indexed version for a library (spec §4.H) and serves ranked
//! results by combining vector recall with a lexical re-rank pass, or by
//! falling straight through to full-text search for exact-match queries
//! (spec §4.G).

mod bm25;
mod search;
mod version;

pub use search::{search, SearchRequest};
pub use version::find_best_version;

#[cfg(test)]
mod tests {
    use super::*;
    use docsforge_embed::DeterministicHashEmbedder;
    use docsforge_shared::{Chunk, ChunkType, SectionPath};
    use docsforge_store::Store;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    async fn seeded_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::open(&path).await.unwrap();
        store.initialize().await.unwrap();
        (dir, store)
    }

    fn chunk(url: &str, content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            types: BTreeSet::from([ChunkType::Text]),
            section: SectionPath::default(),
            source_url: url.to_string(),
            title: "doc".to_string(),
            library: String::new(),
            version: String::new(),
            embedding: vec![0.1; 256],
            chunk_index: 0,
        }
    }

    #[tokio::test]
    async fn search_with_no_indexed_versions_raises_library_not_found() {
        let (_dir, store) = seeded_store().await;
        let embedder: Arc<dyn docsforge_embed::Embedder> = Arc::new(DeterministicHashEmbedder::default());
        let request = SearchRequest {
            library: "nope",
            version: None,
            query: "anything",
            limit: 5,
            exact_match: false,
        };
        let err = search(&store, &embedder, request).await.unwrap_err();
        assert_eq!(err.kind_name(), "LibraryNotFound");
    }

    #[tokio::test]
    async fn exact_match_search_bypasses_vector_recall() {
        let (_dir, store) = seeded_store().await;
        store
            .add_chunks(
                "react",
                "",
                vec![
                    chunk("https://react.dev/a", "hooks let you use state in function components"),
                    chunk("https://react.dev/b", "completely unrelated paragraph of prose"),
                ],
            )
            .await
            .unwrap();

        let embedder: Arc<dyn docsforge_embed::Embedder> = Arc::new(DeterministicHashEmbedder::default());
        let request = SearchRequest {
            library: "react",
            version: None,
            query: "hooks",
            limit: 5,
            exact_match: true,
        };
        let results = search(&store, &embedder, request).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("hooks"));
    }

    #[tokio::test]
    async fn vector_search_returns_candidates_within_limit() {
        let (_dir, store) = seeded_store().await;
        store
            .add_chunks(
                "react",
                "18.2.0",
                vec![
                    chunk("https://react.dev/a", "hooks let you use state in function components"),
                    chunk("https://react.dev/b", "the virtual dom diffing algorithm"),
                    chunk("https://react.dev/c", "server components render ahead of time"),
                ],
            )
            .await
            .unwrap();

        let embedder: Arc<dyn docsforge_embed::Embedder> = Arc::new(DeterministicHashEmbedder::default());
        let request = SearchRequest {
            library: "react",
            version: Some("18.2.0"),
            query: "hooks and state",
            limit: 2,
            exact_match: false,
        };
        let results = search(&store, &embedder, request).await.unwrap();
        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn zero_limit_returns_no_results() {
        let (_dir, store) = seeded_store().await;
        store.add_chunks("react", "", vec![chunk("https://react.dev/a", "hooks")]).await.unwrap();
        let embedder: Arc<dyn docsforge_embed::Embedder> = Arc::new(DeterministicHashEmbedder::default());
        let request = SearchRequest {
            library: "react",
            version: None,
            query: "hooks",
            limit: 0,
            exact_match: false,
        };
        let results = search(&store, &embedder, request).await.unwrap();
        assert!(results.is_empty());
    }
}

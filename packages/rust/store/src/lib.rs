//! Turso Embedded / libSQL storage layer (offline mode).
//!
//! The [`Store`] struct wraps a libSQL database holding the chunk table
//! (one row per split piece, keyed by `(library, version, source_url,
//! chunk_index)`), its FTS5 shadow table for exact-match lexical search,
//! and the job-record table the manager persists crawl state through.

mod migrations;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docsforge_shared::{
    normalize_library, normalize_version, Chunk, ChunkSink, ChunkType, Error, Job, JobId,
    JobProgress, JobStatus, Result, ScrapeOptions, ScoredChunk, SectionPath,
};
use libsql::{params, Connection, Database};

/// Primary storage handle wrapping a libSQL database.
pub struct Store {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

/// A lexical search hit, returned by [`Store::lexical_search`].
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub source_url: String,
    pub content: String,
    pub title: String,
    pub section_path: Vec<String>,
    pub section_level: u8,
    pub score: f32,
}

impl Store {
    /// Open or create a database at `path` in read-write mode, running any
    /// pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        let conn = db.connect().map_err(|e| Error::storage(e.to_string()))?;

        let store = Self { db, conn, readonly: false };
        store.initialize().await?;
        Ok(store)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        let conn = db.connect().map_err(|e| Error::storage(e.to_string()))?;
        Ok(Self { db, conn, readonly: true })
    }

    /// Idempotently apply any pending schema migrations.
    pub async fn initialize(&self) -> Result<()> {
        let current_version = self.schema_version().await;
        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(version = migration.version, description = migration.description, "applying migration");
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| Error::storage(format!("migration v{} failed: {e}", migration.version)))?;
            }
        }
        Ok(())
    }

    async fn schema_version(&self) -> u32 {
        match self.conn.query("SELECT MAX(version) FROM schema_migrations", params![]).await {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            Err(_) => 0,
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(Error::storage("database is opened in read-only mode"));
        }
        Ok(())
    }

    /// Whether any chunk exists for `(library, version)`.
    pub async fn exists(&self, library: &str, version: &str) -> Result<bool> {
        let library = normalize_library(library);
        let version = normalize_version(Some(version));
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM chunks WHERE library_norm = ?1 AND version_norm = ?2 LIMIT 1",
                params![library.as_str(), version.as_str()],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(rows.next().await.map_err(|e| Error::storage(e.to_string()))?.is_some())
    }

    /// Persist `chunks` for `(library, version)` in a single transaction.
    /// `chunk_index` is reassigned per `source_url`, continuing numbering
    /// from any rows already stored for that URL.
    pub async fn add_chunks(&self, library: &str, version: &str, chunks: Vec<Chunk>) -> Result<u64> {
        self.check_writable()?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let library = normalize_library(library);
        let version = normalize_version(Some(version));
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction().await.map_err(|e| Error::storage(e.to_string()))?;

        let mut next_index_by_url: HashMap<String, u32> = HashMap::new();
        let mut written = 0u64;

        for chunk in chunks {
            let next_index = match next_index_by_url.get(&chunk.source_url) {
                Some(&idx) => idx,
                None => {
                    let mut rows = tx
                        .query(
                            "SELECT COALESCE(MAX(chunk_index) + 1, 0) FROM chunks
                             WHERE library_norm = ?1 AND version_norm = ?2 AND source_url = ?3",
                            params![library.as_str(), version.as_str(), chunk.source_url.as_str()],
                        )
                        .await
                        .map_err(|e| Error::storage(e.to_string()))?;
                    match rows.next().await.map_err(|e| Error::storage(e.to_string()))? {
                        Some(row) => row.get::<u32>(0).unwrap_or(0),
                        None => 0,
                    }
                }
            };

            let types_json = serde_json::to_string(&chunk.types).map_err(|e| Error::storage(e.to_string()))?;
            let section_path_json = serde_json::to_string(&chunk.section.path).map_err(|e| Error::storage(e.to_string()))?;
            let embedding_blob = pack_embedding(&chunk.embedding);

            tx.execute(
                "INSERT INTO chunks
                    (library_norm, version_norm, source_url, chunk_index, title, content,
                     types_json, section_level, section_path_json, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(library_norm, version_norm, source_url, chunk_index) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    types_json = excluded.types_json,
                    section_level = excluded.section_level,
                    section_path_json = excluded.section_path_json,
                    embedding = excluded.embedding,
                    created_at = excluded.created_at",
                params![
                    library.as_str(),
                    version.as_str(),
                    chunk.source_url.as_str(),
                    next_index,
                    chunk.title.as_str(),
                    chunk.content.as_str(),
                    types_json.as_str(),
                    chunk.section.level as i64,
                    section_path_json.as_str(),
                    embedding_blob,
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

            next_index_by_url.insert(chunk.source_url.clone(), next_index + 1);
            written += 1;
        }

        tx.commit().await.map_err(|e| Error::storage(e.to_string()))?;
        Ok(written)
    }

    /// Remove exactly the chunks stored for `(library, version)`. An empty
    /// or absent `version` targets only the unversioned bucket.
    pub async fn delete_scope(&self, library: &str, version: &str) -> Result<u64> {
        self.check_writable()?;
        let library = normalize_library(library);
        let version = normalize_version(Some(version));
        let changed = self
            .conn
            .execute(
                "DELETE FROM chunks WHERE library_norm = ?1 AND version_norm = ?2",
                params![library.as_str(), version.as_str()],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(changed)
    }

    /// All distinct versions indexed for `library`, possibly including the
    /// empty string (the unversioned bucket).
    pub async fn query_unique_versions(&self, library: &str) -> Result<Vec<String>> {
        let library = normalize_library(library);
        let mut rows = self
            .conn
            .query(
                "SELECT DISTINCT version_norm FROM chunks WHERE library_norm = ?1",
                params![library.as_str()],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        let mut versions = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            versions.push(row.get::<String>(0).map_err(|e| Error::storage(e.to_string()))?);
        }
        Ok(versions)
    }

    /// Every indexed library mapped to its set of versions.
    pub async fn query_library_versions(&self) -> Result<HashMap<String, HashSet<String>>> {
        let mut rows = self
            .conn
            .query("SELECT DISTINCT library_norm, version_norm FROM chunks", params![])
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        let mut map: HashMap<String, HashSet<String>> = HashMap::new();
        while let Ok(Some(row)) = rows.next().await {
            let library: String = row.get(0).map_err(|e| Error::storage(e.to_string()))?;
            let version: String = row.get(1).map_err(|e| Error::storage(e.to_string()))?;
            map.entry(library).or_default().insert(version);
        }
        Ok(map)
    }

    /// Brute-force cosine-similarity search over the scope's embeddings.
    /// No ANN index: at the chunk counts this store targets, a scoped
    /// linear scan is the straightforward choice.
    pub async fn vector_search(&self, library: &str, version: &str, query_vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let library = normalize_library(library);
        let version = normalize_version(Some(version));

        let mut rows = self
            .conn
            .query(
                "SELECT source_url, title, content, types_json, section_level, section_path_json, embedding
                 FROM chunks WHERE library_norm = ?1 AND version_norm = ?2",
                params![library.as_str(), version.as_str()],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        let mut scored: Vec<ScoredChunk> = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let source_url: String = row.get(0).map_err(|e| Error::storage(e.to_string()))?;
            let title: String = row.get(1).map_err(|e| Error::storage(e.to_string()))?;
            let content: String = row.get(2).map_err(|e| Error::storage(e.to_string()))?;
            let section_level: i64 = row.get(4).map_err(|e| Error::storage(e.to_string()))?;
            let section_path_json: String = row.get(5).map_err(|e| Error::storage(e.to_string()))?;
            let embedding_blob: Vec<u8> = row.get(6).map_err(|e| Error::storage(e.to_string()))?;

            let embedding = unpack_embedding(&embedding_blob);
            let score = cosine_similarity(query_vector, &embedding);
            let section_path: Vec<String> = serde_json::from_str(&section_path_json).unwrap_or_default();

            scored.push(ScoredChunk {
                url: source_url,
                content,
                score,
                title,
                library: library.clone(),
                version: version.clone(),
                section_path,
                section_level: section_level as u8,
            });
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Exact-match lexical search over chunk content via FTS5, for the
    /// engine facade's `exact_match` search mode.
    pub async fn lexical_search(&self, library: &str, version: &str, query: &str, limit: u32) -> Result<Vec<LexicalHit>> {
        let library = normalize_library(library);
        let version = normalize_version(Some(version));

        let mut rows = self
            .conn
            .query(
                "SELECT c.source_url, c.title, c.content, c.section_path_json, c.section_level, fts.rank
                 FROM chunks_fts fts
                 JOIN chunks c ON c.id = fts.rowid
                 WHERE chunks_fts MATCH ?1 AND c.library_norm = ?2 AND c.version_norm = ?3
                 ORDER BY fts.rank
                 LIMIT ?4",
                params![query, library.as_str(), version.as_str(), limit],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        let mut hits = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let source_url: String = row.get(0).map_err(|e| Error::storage(e.to_string()))?;
            let title: String = row.get(1).map_err(|e| Error::storage(e.to_string()))?;
            let content: String = row.get(2).map_err(|e| Error::storage(e.to_string()))?;
            let section_path_json: String = row.get(3).map_err(|e| Error::storage(e.to_string()))?;
            let section_level: i64 = row.get(4).map_err(|e| Error::storage(e.to_string()))?;
            let rank: f64 = row.get(5).unwrap_or(0.0);

            hits.push(LexicalHit {
                source_url,
                content,
                title,
                section_path: serde_json::from_str(&section_path_json).unwrap_or_default(),
                section_level: section_level as u8,
                score: -rank as f32,
            });
        }
        Ok(hits)
    }

    // -----------------------------------------------------------------------
    // Job records
    // -----------------------------------------------------------------------

    pub async fn insert_job(&self, job: &Job) -> Result<()> {
        self.check_writable()?;
        let options_json = serde_json::to_string(&job.options).map_err(|e| Error::storage(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO jobs (id, library, version, seed_url, options_json, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    job.id.to_string(),
                    job.library.as_str(),
                    job.version.as_str(),
                    job.seed_url.as_str(),
                    options_json.as_str(),
                    job_status_name(job.status),
                    job.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(())
    }

    pub async fn update_job(&self, job: &Job) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "UPDATE jobs SET status = ?1, started_at = ?2, finished_at = ?3, error = ?4,
                    pages_processed = ?5, pages_persisted_chunks = ?6, pages_failed = ?7
                 WHERE id = ?8",
                params![
                    job_status_name(job.status),
                    job.started_at.map(|t| t.to_rfc3339()),
                    job.finished_at.map(|t| t.to_rfc3339()),
                    job.error.clone(),
                    job.progress.pages_processed as i64,
                    job.progress.pages_persisted_chunks as i64,
                    job.progress.pages_failed as i64,
                    job.id.to_string(),
                ],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(())
    }

    pub async fn get_job(&self, job_id: JobId) -> Result<Option<Job>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, library, version, seed_url, options_json, status, created_at,
                        started_at, finished_at, error, pages_processed, pages_persisted_chunks, pages_failed
                 FROM jobs WHERE id = ?1",
                params![job_id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        match rows.next().await.map_err(|e| Error::storage(e.to_string()))? {
            Some(row) => Ok(Some(row_to_job(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_jobs(&self, status_filter: Option<JobStatus>) -> Result<Vec<Job>> {
        let mut rows = match status_filter {
            Some(status) => self
                .conn
                .query(
                    "SELECT id, library, version, seed_url, options_json, status, created_at,
                            started_at, finished_at, error, pages_processed, pages_persisted_chunks, pages_failed
                     FROM jobs WHERE status = ?1 ORDER BY created_at",
                    params![job_status_name(status)],
                )
                .await
                .map_err(|e| Error::storage(e.to_string()))?,
            None => self
                .conn
                .query(
                    "SELECT id, library, version, seed_url, options_json, status, created_at,
                            started_at, finished_at, error, pages_processed, pages_persisted_chunks, pages_failed
                     FROM jobs ORDER BY created_at",
                    params![],
                )
                .await
                .map_err(|e| Error::storage(e.to_string()))?,
        };

        let mut jobs = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            jobs.push(row_to_job(&row)?);
        }
        Ok(jobs)
    }

    /// Remove every job record in a terminal state (`completed`, `failed`,
    /// `cancelled`). Returns the number of rows removed.
    pub async fn clear_completed_jobs(&self) -> Result<u64> {
        self.check_writable()?;
        let changed = self
            .conn
            .execute(
                "DELETE FROM jobs WHERE status IN ('completed', 'failed', 'cancelled')",
                params![],
            )
            .await
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(changed)
    }
}

#[async_trait]
impl ChunkSink for Store {
    async fn add_chunks(&self, library: &str, version: &str, chunks: Vec<Chunk>) -> Result<u64> {
        Store::add_chunks(self, library, version, chunks).await
    }
}

fn job_status_name(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "queued",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Cancelling => "cancelling",
        JobStatus::Cancelled => "cancelled",
    }
}

fn parse_job_status(name: &str) -> JobStatus {
    match name {
        "running" => JobStatus::Running,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        "cancelling" => JobStatus::Cancelling,
        "cancelled" => JobStatus::Cancelled,
        _ => JobStatus::Queued,
    }
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("invalid timestamp {s:?}: {e}")))
}

fn row_to_job(row: &libsql::Row) -> Result<Job> {
    let id: String = row.get(0).map_err(|e| Error::storage(e.to_string()))?;
    let options_json: String = row.get(4).map_err(|e| Error::storage(e.to_string()))?;
    let started_at: Option<String> = row.get(7).ok();
    let finished_at: Option<String> = row.get(8).ok();

    Ok(Job {
        id: id.parse().map_err(|e| Error::storage(format!("invalid job id: {e}")))?,
        library: row.get(1).map_err(|e| Error::storage(e.to_string()))?,
        version: row.get(2).map_err(|e| Error::storage(e.to_string()))?,
        seed_url: row.get(3).map_err(|e| Error::storage(e.to_string()))?,
        options: serde_json::from_str::<ScrapeOptions>(&options_json).map_err(|e| Error::storage(e.to_string()))?,
        status: parse_job_status(&row.get::<String>(5).map_err(|e| Error::storage(e.to_string()))?),
        created_at: parse_rfc3339(&row.get::<String>(6).map_err(|e| Error::storage(e.to_string()))?)?,
        started_at: started_at.map(|s| parse_rfc3339(&s)).transpose()?,
        finished_at: finished_at.map(|s| parse_rfc3339(&s)).transpose()?,
        error: row.get::<String>(9).ok(),
        progress: JobProgress {
            pages_processed: row.get::<i64>(10).unwrap_or(0) as u32,
            pages_persisted_chunks: row.get::<i64>(11).unwrap_or(0) as u64,
            pages_failed: row.get::<i64>(12).unwrap_or(0) as u32,
        },
    })
}

fn pack_embedding(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn unpack_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docsforge_shared::{Job, ScrapeOptions, SectionPath};
    use std::collections::BTreeSet;

    async fn test_store() -> Store {
        let tmp = std::env::temp_dir().join(format!("docsforge_test_{}.db", uuid::Uuid::now_v7()));
        Store::open(&tmp).await.expect("open test db")
    }

    fn make_chunk(source_url: &str, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            content: content.to_string(),
            types: BTreeSet::from([ChunkType::Text]),
            section: SectionPath { level: 1, path: vec!["Intro".into()] },
            source_url: source_url.to_string(),
            title: "Intro".to_string(),
            library: "react".to_string(),
            version: "18.0.0".to_string(),
            embedding,
            chunk_index: 0,
        }
    }

    #[tokio::test]
    async fn open_runs_migrations() {
        let store = test_store().await;
        assert_eq!(store.schema_version().await, 1);
    }

    #[tokio::test]
    async fn add_chunks_assigns_monotonic_index_per_url() {
        let store = test_store().await;
        let first = vec![make_chunk("https://x/a", "one", vec![1.0, 0.0])];
        let second = vec![make_chunk("https://x/a", "two", vec![0.0, 1.0])];

        store.add_chunks("react", "18.0.0", first).await.unwrap();
        store.add_chunks("react", "18.0.0", second).await.unwrap();

        assert!(store.exists("react", "18.0.0").await.unwrap());
        let versions = store.query_unique_versions("react").await.unwrap();
        assert_eq!(versions, vec!["18.0.0".to_string()]);
    }

    #[tokio::test]
    async fn delete_scope_removes_only_matching_scope() {
        let store = test_store().await;
        store.add_chunks("react", "18.0.0", vec![make_chunk("https://x/a", "one", vec![1.0])]).await.unwrap();
        store.add_chunks("react", "17.0.0", vec![make_chunk("https://x/b", "two", vec![1.0])]).await.unwrap();

        store.delete_scope("react", "18.0.0").await.unwrap();

        assert!(!store.exists("react", "18.0.0").await.unwrap());
        assert!(store.exists("react", "17.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn vector_search_ranks_by_cosine_similarity() {
        let store = test_store().await;
        store
            .add_chunks(
                "react",
                "18.0.0",
                vec![
                    make_chunk("https://x/a", "aligned", vec![1.0, 0.0]),
                    make_chunk("https://x/b", "orthogonal", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.vector_search("react", "18.0.0", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].content, "aligned");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn lexical_search_matches_content() {
        let store = test_store().await;
        store
            .add_chunks(
                "react",
                "18.0.0",
                vec![
                    make_chunk("https://x/a", "installing the command line tool", vec![1.0]),
                    make_chunk("https://x/b", "an unrelated paragraph about hooks", vec![1.0]),
                ],
            )
            .await
            .unwrap();

        let hits = store.lexical_search("react", "18.0.0", "installing", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].content.contains("installing"));
    }

    #[tokio::test]
    async fn job_lifecycle_round_trips() {
        let store = test_store().await;
        let job = Job::new("react".into(), "".into(), "https://react.dev".into(), ScrapeOptions::default(), Utc::now());
        store.insert_job(&job).await.unwrap();

        let fetched = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Queued);

        let mut running = fetched.clone();
        running.status = JobStatus::Running;
        running.started_at = Some(Utc::now());
        running.progress.pages_processed = 3;
        store.update_job(&running).await.unwrap();

        let fetched = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Running);
        assert_eq!(fetched.progress.pages_processed, 3);
    }

    #[tokio::test]
    async fn list_jobs_filters_by_status() {
        let store = test_store().await;
        let a = Job::new("a".into(), "".into(), "https://a".into(), ScrapeOptions::default(), Utc::now());
        let mut b = Job::new("b".into(), "".into(), "https://b".into(), ScrapeOptions::default(), Utc::now());
        b.status = JobStatus::Completed;
        store.insert_job(&a).await.unwrap();
        store.insert_job(&b).await.unwrap();
        store.update_job(&b).await.unwrap();

        let completed = store.list_jobs(Some(JobStatus::Completed)).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].library, "b");
    }

    #[tokio::test]
    async fn clear_completed_jobs_removes_only_terminal_rows() {
        let store = test_store().await;
        let queued = Job::new("a".into(), "".into(), "https://a".into(), ScrapeOptions::default(), Utc::now());
        let mut cancelled = Job::new("b".into(), "".into(), "https://b".into(), ScrapeOptions::default(), Utc::now());
        cancelled.status = JobStatus::Cancelled;
        store.insert_job(&queued).await.unwrap();
        store.insert_job(&cancelled).await.unwrap();

        let removed = store.clear_completed_jobs().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get_job(queued.id).await.unwrap().is_some());
        assert!(store.get_job(cancelled.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn readonly_store_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("docsforge_test_{}.db", uuid::Uuid::now_v7()));
        let rw = Store::open(&tmp).await.unwrap();
        drop(rw);

        let ro = Store::open_readonly(&tmp).await.unwrap();
        let result = ro.add_chunks("react", "18.0.0", vec![make_chunk("https://x/a", "one", vec![1.0])]).await;
        assert!(result.is_err());
    }
}

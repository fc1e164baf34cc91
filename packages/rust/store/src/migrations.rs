//! SQL migration definitions for the docsforge database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: chunks, chunks_fts, jobs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Chunk store, keyed by (library, version, source_url, chunk_index)
CREATE TABLE IF NOT EXISTS chunks (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    library_norm      TEXT NOT NULL,
    version_norm      TEXT NOT NULL,
    source_url        TEXT NOT NULL,
    chunk_index       INTEGER NOT NULL,
    title             TEXT NOT NULL,
    content           TEXT NOT NULL,
    types_json        TEXT NOT NULL,
    section_level     INTEGER NOT NULL,
    section_path_json TEXT NOT NULL,
    embedding         BLOB NOT NULL,
    created_at        TEXT NOT NULL,
    UNIQUE(library_norm, version_norm, source_url, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_chunks_scope ON chunks(library_norm, version_norm);
CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(library_norm, version_norm, source_url);

-- Full-text index over chunk content, for exact_match lexical search.
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    content,
    content=chunks,
    content_rowid=id
);

CREATE TRIGGER IF NOT EXISTS chunks_fts_insert AFTER INSERT ON chunks BEGIN
    INSERT INTO chunks_fts(rowid, content) VALUES (new.id, new.content);
END;

CREATE TRIGGER IF NOT EXISTS chunks_fts_delete AFTER DELETE ON chunks BEGIN
    INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES ('delete', old.id, old.content);
END;

CREATE TRIGGER IF NOT EXISTS chunks_fts_update AFTER UPDATE ON chunks BEGIN
    INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES ('delete', old.id, old.content);
    INSERT INTO chunks_fts(rowid, content) VALUES (new.id, new.content);
END;

-- Job records
CREATE TABLE IF NOT EXISTS jobs (
    id                      TEXT PRIMARY KEY,
    library                 TEXT NOT NULL,
    version                 TEXT NOT NULL,
    seed_url                TEXT NOT NULL,
    options_json            TEXT NOT NULL,
    status                  TEXT NOT NULL,
    created_at              TEXT NOT NULL,
    started_at              TEXT,
    finished_at             TEXT,
    error                   TEXT,
    pages_processed         INTEGER NOT NULL DEFAULT 0,
    pages_persisted_chunks  INTEGER NOT NULL DEFAULT 0,
    pages_failed            INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}

//! Climate-knowledge index: a persisted vector store over a local PDF corpus.
//!
//! On first use the corpus directory is ingested (PDF text extraction,
//! overlapping chunking, embedding) and the result is persisted to a SQLite
//! database with a sqlite-vec `vec0` table; later runs open the database
//! directly. Every failure path yields `None`; the knowledge tool answers
//! with a fixed "no knowledge" string instead, and the rest of the assistant
//! keeps working.

pub mod ingest;

use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use sqlite_vec::sqlite3_vec_init;

use crate::config::KnowledgeConfig;
use crate::embedding::{EmbeddingProvider, EMBEDDING_DIM};

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    content TEXT NOT NULL
);
"#;

const VEC_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_vec USING vec0(
    id INTEGER PRIMARY KEY,
    embedding FLOAT[384]
);
"#;

/// Initialize the chunk and vector tables. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VEC_TABLE_SQL)?;
    Ok(())
}

/// Handle to the persisted knowledge index.
pub struct KnowledgeIndex {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl KnowledgeIndex {
    /// Open the index if it already exists on disk, otherwise ingest the PDF
    /// corpus and build it. Any failure (missing corpus, unreadable PDFs,
    /// embedding errors) logs a warning and returns `None`.
    ///
    /// The existence check is the only guard against rebuilds; concurrent
    /// first-time builds from separate processes are not serialized.
    pub fn open_or_build(
        config: &KnowledgeConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Option<Self> {
        let index_path = crate::config::expand_tilde(&config.index_path);
        let result = if index_path.exists() {
            Self::open(&index_path, embedder).map(|idx| {
                tracing::info!(path = %index_path.display(), "loaded existing knowledge index");
                idx
            })
        } else {
            Self::build(config, &index_path, embedder)
        };

        match result {
            Ok(index) => Some(index),
            Err(err) => {
                tracing::warn!(error = %err, "knowledge index unavailable");
                None
            }
        }
    }

    /// Delete any existing index and build it fresh from the corpus.
    pub fn rebuild(config: &KnowledgeConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let index_path = crate::config::expand_tilde(&config.index_path);
        if index_path.exists() {
            std::fs::remove_file(&index_path)
                .with_context(|| format!("failed to remove {}", index_path.display()))?;
        }
        Self::build(config, &index_path, embedder)
    }

    fn open(path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        load_sqlite_vec();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open knowledge index at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_schema(&conn).context("failed to initialize knowledge schema")?;
        Ok(Self::from_connection(conn, embedder))
    }

    fn build(
        config: &KnowledgeConfig,
        index_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let documents = ingest::load_corpus(Path::new(&config.corpus_dir))?;

        if let Some(parent) = index_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let index = Self::open(index_path, embedder)?;
        let mut total_chunks = 0usize;
        for doc in &documents {
            let chunks = ingest::chunk_text(&doc.text, config.chunk_size, config.chunk_overlap);
            total_chunks += chunks.len();
            index.insert_chunks(&doc.source, &chunks)?;
        }
        tracing::info!(
            documents = documents.len(),
            chunks = total_chunks,
            path = %index_path.display(),
            "knowledge index built"
        );
        Ok(index)
    }

    /// Wrap an already-open connection. Used by the build path and by tests
    /// running against in-memory databases.
    pub fn from_connection(conn: Connection, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            conn: Mutex::new(conn),
            embedder,
        }
    }

    /// Embed and store a document's chunks.
    pub fn insert_chunks(&self, source: &str, chunks: &[String]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let refs: Vec<&str> = chunks.iter().map(|s| s.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&refs)?;

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;
        let tx = conn.transaction()?;
        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            anyhow::ensure!(
                embedding.len() == EMBEDDING_DIM,
                "embedder produced {} dimensions, expected {EMBEDDING_DIM}",
                embedding.len()
            );
            tx.execute(
                "INSERT INTO chunks (source, content) VALUES (?1, ?2)",
                params![source, chunk],
            )?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO chunks_vec (id, embedding) VALUES (?1, ?2)",
                params![id, embedding_to_bytes(embedding)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Nearest-neighbor search: the `k` chunk texts closest to `text`, best
    /// first.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        let embedding = self.embedder.embed(text)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;

        let mut stmt = conn.prepare(
            "SELECT c.content FROM chunks_vec v \
             JOIN chunks c ON c.id = v.id \
             WHERE v.embedding MATCH ?1 AND k = ?2 ORDER BY v.distance",
        )?;
        let results = stmt
            .query_map(params![embedding_to_bytes(&embedding), k as i64], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Number of stored chunks.
    pub fn len(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

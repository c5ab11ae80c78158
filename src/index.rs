//! # Similarity Index Module
//!
//! ## Purpose
//! Persisted collection of document representations supporting ranked
//! nearest-match queries over previously ingested documents.
//!
//! ## Input/Output Specification
//! - **Input**: Documents to ingest, query documents
//! - **Output**: Similarity results ranked by descending score (0-100)
//! - **Storage**: Sled embedded database, one entry per filename
//!
//! ## Key Features
//! - Idempotent upsert keyed by filename; re-ingest overwrites the entry
//! - Atomic per-entry updates; one failed ingest never corrupts the store
//! - Deterministic scoring: cosine similarity scaled to 0-100, ties broken
//!   by filename ascending
//! - Stored text kept gzip-compressed so entries can be re-embedded when the
//!   embedding scheme changes

use crate::embed::{cosine_similarity, Embedder};
use crate::errors::{ProcessError, Result};
use crate::extract::PdfTextExtractor;
use crate::{config::StoreConfig, text, SimilarityResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const ENTRIES_TREE: &str = "documents";

/// Persisted similarity store over ingested documents.
pub struct SimilarityIndex {
    db: sled::Db,
    entries: sled::Tree,
    embedder: Arc<dyn Embedder>,
    extractor: PdfTextExtractor,
}

/// One persisted entry: the derived embedding plus the compressed normalized
/// text it was derived from.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    embedding: Vec<f32>,
    ingested_at: chrono::DateTime<chrono::Utc>,
    compressed_text: Vec<u8>,
}

/// Directory ingestion statistics
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub ingested: usize,
    pub failed: usize,
}

impl SimilarityIndex {
    /// Open (or create) the store at the configured path.
    pub fn open(config: &StoreConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(&config.db_path)?;
        let entries = db.open_tree(ENTRIES_TREE)?;

        let index = Self {
            db,
            entries,
            embedder,
            extractor: PdfTextExtractor::new(),
        };
        tracing::info!(
            "Similarity store opened at {:?} with {} entries",
            config.db_path,
            index.len()
        );
        Ok(index)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract a document and upsert its representation keyed by filename.
    pub async fn ingest(&self, path: &Path) -> Result<()> {
        let filename = filename_of(path)?;
        let raw = self.extractor.extract_text(path).await?;
        self.ingest_text(&filename, &raw)
    }

    /// Upsert an entry for already-extracted text. The write is a single
    /// keyed insert, so a failure leaves prior state untouched and other
    /// entries unaffected.
    pub fn ingest_text(&self, filename: &str, raw_text: &str) -> Result<()> {
        let normalized = text::normalize(raw_text);
        let entry = StoredEntry {
            embedding: self.embedder.embed(&normalized),
            ingested_at: chrono::Utc::now(),
            compressed_text: compress(&normalized).map_err(|e| ProcessError::Store {
                filename: filename.to_string(),
                details: e.to_string(),
            })?,
        };
        let value = bincode::serialize(&entry).map_err(|e| ProcessError::Store {
            filename: filename.to_string(),
            details: e.to_string(),
        })?;

        self.entries
            .insert(filename.as_bytes(), value)
            .map_err(|e| ProcessError::Store {
                filename: filename.to_string(),
                details: e.to_string(),
            })?;
        self.entries.flush().map_err(|e| ProcessError::Store {
            filename: filename.to_string(),
            details: e.to_string(),
        })?;

        tracing::debug!("Ingested '{}' into the similarity store", filename);
        Ok(())
    }

    /// Ingest every PDF in a directory. A failed entry is logged and
    /// skipped; the rest of the batch continues.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IndexStats> {
        let files = crate::pipeline::collect_pdf_files(dir)?;
        tracing::info!("Ingesting {} PDF files from {:?}", files.len(), dir);

        let mut stats = IndexStats::default();
        for path in files {
            match self.ingest(&path).await {
                Ok(()) => stats.ingested += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!("Failed to ingest {:?} ({}): {}", path, e.category(), e);
                }
            }
        }

        tracing::info!(
            "Ingestion completed: {} stored, {} failed",
            stats.ingested,
            stats.failed
        );
        Ok(stats)
    }

    /// Rank every stored entry against a query document.
    pub async fn find_similar(&self, path: &Path) -> Result<Vec<SimilarityResult>> {
        let raw = self.extractor.extract_text(path).await?;
        self.find_similar_text(&raw)
    }

    /// Rank every stored entry against already-extracted query text.
    ///
    /// Scores are cosine similarity scaled to [0, 100], sorted descending
    /// with ties broken by filename ascending. An empty store yields an
    /// empty result, not an error.
    pub fn find_similar_text(&self, raw_text: &str) -> Result<Vec<SimilarityResult>> {
        let query = self.embedder.embed(&text::normalize(raw_text));

        let mut results = Vec::new();
        for item in self.entries.iter() {
            let (key, value) = item?;
            let filename = String::from_utf8_lossy(&key).to_string();
            let entry: StoredEntry = match bincode::deserialize(&value) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping undecodable store entry '{}': {}", filename, e);
                    continue;
                }
            };
            let score = (cosine_similarity(&query, &entry.embedding) * 100.0).clamp(0.0, 100.0);
            results.push(SimilarityResult {
                filename,
                similarity_score: score,
            });
        }

        results.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(results)
    }

    /// Re-derive every stored embedding from the entry's stored text, for
    /// use after the embedding scheme changes.
    pub fn rebuild(&self) -> Result<usize> {
        let mut rebuilt = 0;
        for item in self.entries.iter() {
            let (key, value) = item?;
            let filename = String::from_utf8_lossy(&key).to_string();
            let mut entry: StoredEntry =
                bincode::deserialize(&value).map_err(|e| ProcessError::Store {
                    filename: filename.clone(),
                    details: format!("undecodable entry: {}", e),
                })?;
            let stored_text = decompress(&entry.compressed_text).map_err(|e| {
                ProcessError::Store {
                    filename: filename.clone(),
                    details: e.to_string(),
                }
            })?;
            entry.embedding = self.embedder.embed(&stored_text);
            let updated = bincode::serialize(&entry)?;
            self.entries.insert(key, updated)?;
            rebuilt += 1;
        }
        self.entries.flush()?;
        tracing::info!("Rebuilt {} store embeddings", rebuilt);
        Ok(rebuilt)
    }

    /// Flush pending writes before shutdown.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn filename_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ProcessError::Store {
            filename: path.display().to_string(),
            details: "path has no filename component".to_string(),
        })
}

fn compress(text: &str) -> std::io::Result<Vec<u8>> {
    use std::io::Write;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()
}

fn decompress(data: &[u8]) -> std::io::Result<String> {
    use std::io::Read;
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(text)
}

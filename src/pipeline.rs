//! # Document Processing Pipeline
//!
//! ## Purpose
//! Orchestrates the per-document workflow (extract text, extract structured
//! record, summarize fields, assemble the final record) and drives batches
//! over a directory of PDF files.
//!
//! ## Input/Output Specification
//! - **Input**: A document path, or a directory of PDFs plus an output path
//! - **Output**: `ProcessedRecord` per document; a single JSON array in batch mode
//! - **Workflow**: Extract → Structure → Summarize (fan-out) → Assemble
//!
//! ## Key Features
//! - Sequential per-document batch processing; fatal per-document errors are
//!   logged with the filename and skipped, never aborting the batch
//! - No partial records: a document either yields a complete record or nothing
//! - Batch statistics tracking with start/end timestamps
//! - Output JSON preserves non-ASCII characters and stable field ordering

use crate::config::Config;
use crate::errors::Result;
use crate::extract::PdfTextExtractor;
use crate::extraction::InformationExtractor;
use crate::llm::LlmBackend;
use crate::summarize::FieldSummarizer;
use crate::ProcessedRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-document orchestrator and batch driver.
pub struct DocumentPipeline {
    extractor: PdfTextExtractor,
    information: InformationExtractor,
    summarizer: FieldSummarizer,
    stats: Arc<RwLock<PipelineStats>>,
}

/// Batch execution statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Total documents attempted
    pub total_processed: usize,
    /// Documents that produced a complete record
    pub succeeded: usize,
    /// Documents skipped after a fatal per-document error
    pub failed: usize,
    /// Start time of the current run
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// End time of the current run
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl DocumentPipeline {
    /// Build a pipeline sharing one backend handle across extraction and
    /// summarization.
    pub fn new(config: &Config, backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            extractor: PdfTextExtractor::new(),
            information: InformationExtractor::new(backend.clone(), config.llm.max_input_chars),
            summarizer: FieldSummarizer::new(backend, &config.summarizer),
            stats: Arc::new(RwLock::new(PipelineStats::default())),
        }
    }

    /// Process a single document end to end.
    ///
    /// Text extraction and structured extraction failures are fatal for the
    /// document; summarization failures degrade per field.
    pub async fn process_document(&self, path: &Path) -> Result<ProcessedRecord> {
        let text = self.extractor.extract_text(path).await?;
        if text.trim().is_empty() {
            tracing::warn!("No text extracted from {:?}; proceeding with empty input", path);
        }
        self.process_text(&text).await
    }

    /// Run the structured-extraction and summarization stages on text that
    /// was already extracted.
    pub async fn process_text(&self, text: &str) -> Result<ProcessedRecord> {
        let doc = self.information.extract(text).await?;
        let summaries = self.summarizer.summarize_document(&doc).await;

        Ok(ProcessedRecord {
            case_number: doc.case_number,
            petitioner_name: doc.petitioner_name,
            respondent_name: doc.respondent_name,
            city: doc.city,
            petitioner_issues_summary: summaries.petitioner_issues,
            respondent_issues_summary: summaries.respondent_issues,
            hearing_points_summary: summaries.hearing_points,
            final_decision_summary: summaries.final_decision,
            is_appeal: doc.is_appeal,
            appeal_subject: doc.appeal_subject,
            appeal_decision: doc.appeal_decision,
        })
    }

    /// Process every PDF in `dir` sequentially and write the collected
    /// records to `output` as one JSON array. Fatal per-document errors are
    /// logged and the batch continues with the next file.
    pub async fn process_directory(&self, dir: &Path, output: &Path) -> Result<PipelineStats> {
        {
            let mut stats = self.stats.write().await;
            *stats = PipelineStats {
                start_time: Some(chrono::Utc::now()),
                ..PipelineStats::default()
            };
        }

        let files = collect_pdf_files(dir)?;
        tracing::info!("Found {} PDF files in {:?}", files.len(), dir);

        let mut records: Vec<ProcessedRecord> = Vec::new();
        for path in files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            tracing::info!("Processing {}...", filename);

            let mut stats = self.stats.write().await;
            stats.total_processed += 1;
            drop(stats);

            match self.process_document(&path).await {
                Ok(record) => {
                    records.push(record);
                    self.stats.write().await.succeeded += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to process {} ({}): {}",
                        filename,
                        e.category(),
                        e
                    );
                    self.stats.write().await.failed += 1;
                }
            }
        }

        self.write_results(&records, output).await?;

        let mut stats = self.stats.write().await;
        stats.end_time = Some(chrono::Utc::now());
        let final_stats = stats.clone();
        drop(stats);

        tracing::info!(
            "Batch completed: {} processed, {} succeeded, {} failed",
            final_stats.total_processed,
            final_stats.succeeded,
            final_stats.failed
        );

        Ok(final_stats)
    }

    /// Serialize records as a pretty-printed JSON array. serde_json leaves
    /// non-ASCII characters unescaped, matching the output contract.
    async fn write_results(&self, records: &[ProcessedRecord], output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(output, json).await?;
        tracing::info!("Results saved to {:?}", output);
        Ok(())
    }

    /// Current batch statistics
    pub async fn stats(&self) -> PipelineStats {
        self.stats.read().await.clone()
    }
}

/// List the `.pdf` files in a directory, sorted by filename for a
/// deterministic processing order.
pub fn collect_pdf_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if path.is_file() && is_pdf {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pdf_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = collect_pdf_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn collect_pdf_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_pdf_files(dir.path()).unwrap().is_empty());
    }
}

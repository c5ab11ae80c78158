//! # PDF Text Extraction Module
//!
//! ## Purpose
//! Produces the raw, page-concatenated text of a PDF document for the
//! downstream information-extraction step.
//!
//! ## Input/Output Specification
//! - **Input**: Path to a PDF file
//! - **Output**: Concatenated text of all pages in document order
//! - **Failure**: Corrupt or unreadable files fail with `ProcessError::Extraction`;
//!   a parseable document with no text (e.g. scanned images) is valid-but-empty
//!
//! No retries are attempted here; the batch driver decides whether to skip
//! the document.

use crate::errors::{ProcessError, Result};
use std::path::Path;

/// Extracts raw text from PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the full text of the document at `path`.
    ///
    /// Parsing is CPU-bound, so it runs on the blocking thread pool.
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        let display_path = path.display().to_string();
        let owned = path.to_path_buf();

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| ProcessError::Extraction {
                file: display_path.clone(),
                details: format!("extraction task failed: {}", e),
            })?
            .map_err(|e| ProcessError::Extraction {
                file: display_path.clone(),
                details: e.to_string(),
            })?;

        tracing::debug!("Extracted {} chars from {}", text.len(), display_path);
        Ok(text)
    }
}

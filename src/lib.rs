//! # Legal Document Extraction & Similarity Pipeline
//!
//! ## Overview
//! This library extracts structured records from legal-case PDF documents
//! using a generative-language backend, produces per-field summaries, and
//! maintains a persisted similarity index over processed documents.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `extract`: PDF text extraction (page-concatenated raw text)
//! - `llm`: Generative-language backend client behind a swappable trait
//! - `extraction`: Structured information extraction from raw text
//! - `summarize`: Concurrent per-field summarization with bounded fan-out
//! - `pipeline`: Per-document orchestration and the sequential batch driver
//! - `index`: Persisted similarity store with ranked nearest-match queries
//! - `embed`: Deterministic document embedding strategies
//! - `text`: Normalization and tokenization for embeddings
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: A directory of PDF files (batch mode) or a single PDF (query mode)
//! - **Output**: A JSON array of processed records, or ranked similarity results
//! - **Guarantees**: No partial records; deterministic similarity ordering
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use legal_doc_pipeline::{Config, DocumentPipeline, GeminiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let backend = Arc::new(GeminiClient::new(&config.llm)?);
//!     let pipeline = DocumentPipeline::new(&config, backend);
//!     let stats = pipeline
//!         .process_directory(&config.paths.pdf_dir, &config.paths.output_file)
//!         .await?;
//!     println!("Processed {} documents", stats.succeeded);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod embed;
pub mod errors;
pub mod extract;
pub mod extraction;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod summarize;
pub mod text;

// Re-exports for convenience
pub use config::Config;
pub use errors::{ProcessError, Result};
pub use index::SimilarityIndex;
pub use llm::{GeminiClient, LlmBackend};
pub use pipeline::{DocumentPipeline, PipelineStats};

use serde::{Deserialize, Serialize};

/// Structured record extracted from a single legal document.
///
/// All eleven fields must be present in the model response before this type
/// is constructed; absence of any field is a hard extraction failure, never
/// a partial result. The appeal fields are keys that may carry null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalDocument {
    /// Court case number
    pub case_number: String,
    /// Petitioner name
    pub petitioner_name: String,
    /// Respondent name
    pub respondent_name: String,
    /// City where the case was heard
    pub city: String,
    /// Main issues raised by the petitioner, in document order
    pub petitioner_issues: Vec<String>,
    /// Main issues raised by the respondent, in document order
    pub respondent_issues: Vec<String>,
    /// Key points made during the hearing (not the decision)
    pub hearing_points: Vec<String>,
    /// Final decision text
    pub final_decision: String,
    /// Whether this case is an appeal
    pub is_appeal: bool,
    /// What the appeal is about (appeals only)
    pub appeal_subject: Option<String>,
    /// The appeal decision (appeals only)
    pub appeal_decision: Option<String>,
}

/// Final output record assembled per document: case metadata plus one short
/// summary per summarized field. Created once per input document, immutable
/// after assembly. Field order here fixes the serialized output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub case_number: String,
    pub petitioner_name: String,
    pub respondent_name: String,
    pub city: String,
    pub petitioner_issues_summary: String,
    pub respondent_issues_summary: String,
    pub hearing_points_summary: String,
    pub final_decision_summary: String,
    pub is_appeal: bool,
    pub appeal_subject: Option<String>,
    pub appeal_decision: Option<String>,
}

/// One ranked match from a similarity query. Scores are cosine similarity
/// scaled to the 0-100 range. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Filename the matched entry was ingested under
    pub filename: String,
    /// Similarity score in [0, 100], higher is closer
    pub similarity_score: f32,
}

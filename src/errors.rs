//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the document pipeline, providing the error
//! taxonomy shared by every component and the fatal/non-fatal classification
//! used by the batch driver.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from extraction, the LLM backend, the store
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Extraction, Parsing, Summarization, Store, Backend
//!
//! ## Key Features
//! - Per-document fatal errors (extraction, parse, missing fields) that the
//!   batch driver logs and skips
//! - Non-fatal degradations (summaries, store entries) that never abort a batch
//! - Automatic conversion from I/O, JSON, database and HTTP errors

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Error types for the legal document pipeline
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Text could not be obtained from the source document
    #[error("Failed to extract text from '{file}': {details}")]
    Extraction { file: String, details: String },

    /// Model response was not valid structured data
    #[error("Model response was not valid JSON: {details}")]
    ResponseParse { details: String },

    /// Parsed structured data lacked one or more required fields
    #[error("Model response missing required field(s): {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// One field's summarization failed
    #[error("Summarization of '{field}' failed: {reason}")]
    Summary { field: String, reason: String },

    /// Similarity-index persistence failed for one entry
    #[error("Similarity store update failed for '{filename}': {details}")]
    Store { filename: String, details: String },

    /// Generative-language backend returned an error
    #[error("Backend error: {details}")]
    Backend { details: String },

    /// Backend call exceeded its timeout
    #[error("Backend call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors (output writing, not model responses)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Binary serialization errors for stored entries
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl ProcessError {
    /// Whether this error aborts the enclosing document (the batch driver
    /// logs it and continues with the next file). Summary and store errors
    /// degrade instead of aborting.
    pub fn is_document_fatal(&self) -> bool {
        matches!(
            self,
            ProcessError::Extraction { .. }
                | ProcessError::ResponseParse { .. }
                | ProcessError::MissingFields { .. }
                | ProcessError::Backend { .. }
                | ProcessError::Timeout { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ProcessError::Extraction { .. } => "extraction",
            ProcessError::ResponseParse { .. } | ProcessError::MissingFields { .. } => "parsing",
            ProcessError::Summary { .. } => "summarization",
            ProcessError::Store { .. }
            | ProcessError::Database(_)
            | ProcessError::Serialization(_) => "store",
            ProcessError::Backend { .. } | ProcessError::Timeout { .. } => "backend",
            ProcessError::Config { .. } => "configuration",
            ProcessError::Io(_) | ProcessError::Json(_) => "io",
        }
    }
}

impl From<reqwest::Error> for ProcessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProcessError::Timeout { seconds: 0 }
        } else {
            ProcessError::Backend {
                details: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        let fatal = ProcessError::MissingFields {
            fields: vec!["city".to_string()],
        };
        assert!(fatal.is_document_fatal());

        let degraded = ProcessError::Summary {
            field: "hearing_points".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(!degraded.is_document_fatal());

        let store = ProcessError::Store {
            filename: "a.pdf".to_string(),
            details: "disk full".to_string(),
        };
        assert!(!store.is_document_fatal());
    }

    #[test]
    fn missing_fields_message_names_every_field() {
        let err = ProcessError::MissingFields {
            fields: vec!["city".to_string(), "final_decision".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("city"));
        assert!(msg.contains("final_decision"));
    }
}

//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the document pipeline, supporting TOML files
//! and environment-variable overrides with validation and type-safe access.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Required credential presence, range checks
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! The one required setting is the backend API key (`GOOGLE_API_KEY`); its
//! absence is a startup-fatal error before any document is processed.

use crate::errors::{ProcessError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative-language backend settings
    pub llm: LlmConfig,
    /// Field summarization settings
    pub summarizer: SummarizerConfig,
    /// Similarity store settings
    pub store: StoreConfig,
    /// Input/output paths
    pub paths: PathsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Generative-language backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key for the backend (usually supplied via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Document text beyond this many bytes is truncated (on a char
    /// boundary) before prompting, with a warning logged
    pub max_input_chars: usize,
}

/// Field summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Maximum simultaneous in-flight summarization requests per document
    pub max_workers: usize,
    /// Per-field timeout in seconds; a timeout degrades that field to a
    /// placeholder summary instead of failing the document
    pub request_timeout_seconds: u64,
}

/// Similarity store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database directory path
    pub db_path: PathBuf,
    /// Embedding vector dimension
    pub embedding_dimension: usize,
}

/// Input/output path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for PDF files in batch mode
    pub pdf_dir: PathBuf,
    /// Output file for the batch JSON array
    pub output_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist. Environment overrides are applied and
    /// the result is validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ProcessError::Config {
                message: format!("Failed to read config file {:?}: {}", path, e),
            })?;
            toml::from_str(&content).map_err(|e| ProcessError::Config {
                message: format!("Failed to parse config file {:?}: {}", path, e),
            })?
        } else {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("GOOGLE_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Ok(model) = std::env::var("LEGAL_PIPELINE_MODEL") {
            self.llm.model = model;
        }
        if let Ok(db_path) = std::env::var("LEGAL_PIPELINE_DB_PATH") {
            self.store.db_path = PathBuf::from(db_path);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match &self.llm.api_key {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ProcessError::Config {
                    message: "GOOGLE_API_KEY not found in environment or config file".to_string(),
                });
            }
        }

        if self.llm.max_input_chars == 0 {
            return Err(ProcessError::Config {
                message: "llm.max_input_chars must be greater than zero".to_string(),
            });
        }

        if self.llm.request_timeout_seconds == 0 || self.summarizer.request_timeout_seconds == 0 {
            return Err(ProcessError::Config {
                message: "request timeouts must be greater than zero".to_string(),
            });
        }

        if self.summarizer.max_workers == 0 {
            return Err(ProcessError::Config {
                message: "summarizer.max_workers must be greater than zero".to_string(),
            });
        }

        if self.store.embedding_dimension == 0 {
            return Err(ProcessError::Config {
                message: "store.embedding_dimension must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_seconds: 60,
            max_input_chars: 60_000,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/similarity_store"),
            embedding_dimension: 256,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("./data/pdfs"),
            output_file: PathBuf::from("./data/results.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> Config {
        let mut config = Config::default();
        config.llm.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn valid_config_passes() {
        assert!(config_with_key().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let mut config = config_with_key();
        config.summarizer.max_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str("[llm]\nmodel = \"gemini-1.5-pro\"\n").unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.summarizer.max_workers, 4);
        assert_eq!(config.paths.pdf_dir, PathBuf::from("./data/pdfs"));
    }
}

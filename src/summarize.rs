//! # Field Summarization Module
//!
//! ## Purpose
//! Produces short natural-language summaries for selected fields of an
//! extracted record, fanning out one backend request per field under a
//! bounded worker pool and joining all outcomes before assembly.
//!
//! ## Input/Output Specification
//! - **Input**: An extracted `LegalDocument`
//! - **Output**: One summary string per summarized field
//! - **Degradation**: A failed or timed-out field becomes a placeholder
//!   summary embedding the error message; it never aborts the document
//!
//! ## Key Features
//! - Four-way concurrent fan-out bounded by a semaphore
//! - Per-field timeout treated as a per-field failure
//! - List-typed fields flattened into newline-joined text before prompting

use crate::config::SummarizerConfig;
use crate::errors::{ProcessError, Result};
use crate::llm::LlmBackend;
use crate::LegalDocument;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// The four record fields that receive summaries.
pub const SUMMARY_FIELDS: [&str; 4] = [
    "petitioner_issues",
    "respondent_issues",
    "hearing_points",
    "final_decision",
];

/// Summaries gathered for one document, success or placeholder.
#[derive(Debug, Clone)]
pub struct FieldSummaries {
    pub petitioner_issues: String,
    pub respondent_issues: String,
    pub hearing_points: String,
    pub final_decision: String,
}

/// Issues per-field summarization requests against the backend.
#[derive(Clone)]
pub struct FieldSummarizer {
    backend: Arc<dyn LlmBackend>,
    max_workers: usize,
    timeout: Duration,
}

impl FieldSummarizer {
    pub fn new(backend: Arc<dyn LlmBackend>, config: &SummarizerConfig) -> Self {
        Self {
            backend,
            max_workers: config.max_workers,
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    /// Flatten an ordered list field into the newline-joined text the
    /// summarization prompt receives.
    pub fn flatten_list(values: &[String]) -> String {
        values.join("\n")
    }

    fn build_prompt(field: &str, text: &str) -> String {
        format!(
            "Please provide a concise summary of the following {} from a legal document:\n\
             \n\
             {}\n\
             \n\
             Provide a clear, objective summary in 2-3 sentences.",
            field.replace('_', " "),
            text
        )
    }

    /// Summarize one field under the configured timeout. The field name is
    /// used only for prompt framing.
    pub async fn summarize_field(&self, field: &str, text: &str) -> Result<String> {
        let prompt = Self::build_prompt(field, text);
        match tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await {
            Ok(Ok(summary)) => Ok(summary.trim().to_string()),
            Ok(Err(e)) => Err(ProcessError::Summary {
                field: field.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ProcessError::Summary {
                field: field.to_string(),
                reason: format!("timed out after {}s", self.timeout.as_secs()),
            }),
        }
    }

    /// Fan out summarization of the four target fields and join all
    /// outcomes. Each field is independent: a failure degrades that field to
    /// a placeholder and the rest complete normally.
    pub async fn summarize_document(&self, doc: &LegalDocument) -> FieldSummaries {
        let inputs: Vec<(&'static str, String)> = vec![
            ("petitioner_issues", Self::flatten_list(&doc.petitioner_issues)),
            ("respondent_issues", Self::flatten_list(&doc.respondent_issues)),
            ("hearing_points", Self::flatten_list(&doc.hearing_points)),
            ("final_decision", doc.final_decision.clone()),
        ];

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut handles = Vec::with_capacity(inputs.len());

        for (field, text) in inputs {
            let this = self.clone();
            let semaphore = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (field, placeholder("worker pool closed")),
                };
                match this.summarize_field(field, &text).await {
                    Ok(summary) => (field, summary),
                    Err(ProcessError::Summary { field: name, reason }) => {
                        tracing::warn!("Summarization of '{}' degraded: {}", name, reason);
                        (field, placeholder(&reason))
                    }
                    Err(other) => {
                        tracing::warn!("Summarization of '{}' degraded: {}", field, other);
                        (field, placeholder(&other.to_string()))
                    }
                }
            }));
        }

        let mut summaries: HashMap<&'static str, String> = HashMap::new();
        for handle in handles {
            match handle.await {
                Ok((field, summary)) => {
                    summaries.insert(field, summary);
                }
                Err(e) => {
                    tracing::warn!("Summarization task aborted: {}", e);
                }
            }
        }

        let mut take = |field: &'static str| {
            summaries
                .remove(field)
                .unwrap_or_else(|| placeholder("task aborted"))
        };

        FieldSummaries {
            petitioner_issues: take("petitioner_issues"),
            respondent_issues: take("respondent_issues"),
            hearing_points: take("hearing_points"),
            final_decision: take("final_decision"),
        }
    }
}

fn placeholder(reason: &str) -> String {
    format!("Failed to generate summary: {}", reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Echoes the prompt back so tests can inspect what the backend saw.
    struct EchoBackend;

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("summary of: {}", prompt))
        }
    }

    /// Fails whenever the prompt mentions the given marker.
    struct FailOn(&'static str);

    #[async_trait]
    impl LlmBackend for FailOn {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains(self.0) {
                Err(ProcessError::Backend {
                    details: "simulated backend failure".to_string(),
                })
            } else {
                Ok("a short summary".to_string())
            }
        }
    }

    /// Never completes; used to exercise the timeout path.
    struct HangingBackend;

    #[async_trait]
    impl LlmBackend for HangingBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            futures::future::pending().await
        }
    }

    fn summarizer(backend: Arc<dyn LlmBackend>) -> FieldSummarizer {
        FieldSummarizer::new(
            backend,
            &SummarizerConfig {
                max_workers: 4,
                request_timeout_seconds: 1,
            },
        )
    }

    fn sample_doc() -> LegalDocument {
        LegalDocument {
            case_number: "C-1".to_string(),
            petitioner_name: "P".to_string(),
            respondent_name: "R".to_string(),
            city: "Nagpur".to_string(),
            petitioner_issues: vec!["first issue".to_string(), "second issue".to_string()],
            respondent_issues: vec!["only issue".to_string()],
            hearing_points: vec!["point one".to_string()],
            final_decision: "Petition dismissed.".to_string(),
            is_appeal: false,
            appeal_subject: None,
            appeal_decision: None,
        }
    }

    #[test]
    fn list_fields_join_with_newlines() {
        let values = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(FieldSummarizer::flatten_list(&values), "a\nb\nc");
        assert_eq!(FieldSummarizer::flatten_list(&values[..1]), "a");
        assert_eq!(FieldSummarizer::flatten_list(&[]), "");
    }

    #[tokio::test]
    async fn summarize_field_receives_newline_joined_list() {
        let summarizer = summarizer(Arc::new(EchoBackend));
        let doc = sample_doc();
        let text = FieldSummarizer::flatten_list(&doc.petitioner_issues);
        let summary = summarizer
            .summarize_field("petitioner_issues", &text)
            .await
            .unwrap();
        assert!(summary.contains("first issue\nsecond issue"));
    }

    #[tokio::test]
    async fn one_failure_does_not_block_the_others() {
        let summarizer = summarizer(Arc::new(FailOn("hearing points")));
        let summaries = summarizer.summarize_document(&sample_doc()).await;

        assert!(summaries
            .hearing_points
            .starts_with("Failed to generate summary:"));
        assert_eq!(summaries.petitioner_issues, "a short summary");
        assert_eq!(summaries.respondent_issues, "a short summary");
        assert_eq!(summaries.final_decision, "a short summary");
    }

    #[tokio::test]
    async fn timeout_degrades_to_placeholder() {
        let summarizer = summarizer(Arc::new(HangingBackend));
        let err = summarizer
            .summarize_field("final_decision", "some text")
            .await
            .unwrap_err();
        match err {
            ProcessError::Summary { field, reason } => {
                assert_eq!(field, "final_decision");
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected Summary error, got {:?}", other),
        }
    }
}

//! # Information Extraction Module
//!
//! ## Purpose
//! Turns raw document text into a typed `LegalDocument` via a single
//! structured-extraction request to the generative-language backend.
//!
//! ## Input/Output Specification
//! - **Input**: Raw document text of arbitrary length
//! - **Output**: A `LegalDocument` with all eleven fields populated
//! - **Failure**: `ResponseParse` for malformed responses, `MissingFields`
//!   when required keys are absent; both are fatal for the document
//!
//! ## Key Features
//! - Explicit truncation policy for over-long inputs (logged warning)
//! - Two-stage response cleanup: strip an optional fenced code block, then
//!   parse the remainder as JSON, with a distinct error for each stage
//! - Strict required-field validation naming every missing field; defaults
//!   are never substituted
//! - Type normalization only: a bare string in a list-typed field is lifted
//!   into a one-element list

use crate::errors::{ProcessError, Result};
use crate::llm::LlmBackend;
use crate::LegalDocument;
use serde_json::Value;
use std::sync::Arc;

/// The eleven fields every extraction response must contain. The appeal
/// fields must be present as keys but may carry null.
pub const REQUIRED_FIELDS: [&str; 11] = [
    "case_number",
    "petitioner_name",
    "respondent_name",
    "city",
    "petitioner_issues",
    "respondent_issues",
    "hearing_points",
    "final_decision",
    "is_appeal",
    "appeal_subject",
    "appeal_decision",
];

const LIST_FIELDS: [&str; 3] = ["petitioner_issues", "respondent_issues", "hearing_points"];

/// Extracts structured case information from raw document text.
pub struct InformationExtractor {
    backend: Arc<dyn LlmBackend>,
    max_input_chars: usize,
}

impl InformationExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>, max_input_chars: usize) -> Self {
        Self {
            backend,
            max_input_chars,
        }
    }

    /// Extract a `LegalDocument` from raw text.
    pub async fn extract(&self, text: &str) -> Result<LegalDocument> {
        let prompt = self.build_prompt(self.truncate_input(text));
        let response = self.backend.generate(&prompt).await?;
        Self::parse_response(&response)
    }

    /// Truncation policy for over-long inputs: cut at the nearest char
    /// boundary under `max_input_chars` bytes and log a warning.
    fn truncate_input<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.max_input_chars {
            return text;
        }
        let mut end = self.max_input_chars;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        tracing::warn!(
            "Document text truncated from {} to {} bytes before extraction",
            text.len(),
            end
        );
        &text[..end]
    }

    fn build_prompt(&self, text: &str) -> String {
        format!(
            "Please analyze the following legal document and extract key information.\n\
             Focus on identifying:\n\
             - Case number\n\
             - Petitioner name\n\
             - Respondent name\n\
             - City\n\
             - Main issues raised by petitioner\n\
             - Main issues raised by respondent\n\
             - Key points made during hearing (this is not the hearing decision)\n\
             - Final decision\n\
             - If this is an appeal, what is the appeal about and what was the appeal decision\n\
             \n\
             Document text:\n\
             {}\n\
             \n\
             Please format your response as a JSON object with these fields:\n\
             case_number, petitioner_name, respondent_name, city, petitioner_issues (array),\n\
             respondent_issues (array), hearing_points (array), final_decision,\n\
             is_appeal (boolean), appeal_subject (string or null), appeal_decision (string or null)",
            text
        )
    }

    /// Parse a raw model response into a `LegalDocument`.
    ///
    /// Stage 1 strips an optional fenced code block; stage 2 parses JSON and
    /// validates the required fields. No partial record is ever returned.
    pub fn parse_response(response: &str) -> Result<LegalDocument> {
        let cleaned = strip_code_fence(response);

        let value: Value =
            serde_json::from_str(cleaned).map_err(|e| ProcessError::ResponseParse {
                details: e.to_string(),
            })?;

        let mut object = match value {
            Value::Object(map) => map,
            other => {
                return Err(ProcessError::ResponseParse {
                    details: format!("expected a JSON object, got {}", json_type_name(&other)),
                });
            }
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !object.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ProcessError::MissingFields { fields: missing });
        }

        // Lift a bare string in a list-typed field into a one-element list.
        for field in LIST_FIELDS {
            if let Some(Value::String(s)) = object.get(field) {
                let lifted = Value::Array(vec![Value::String(s.clone())]);
                object.insert(field.to_string(), lifted);
            }
        }

        serde_json::from_value(Value::Object(object)).map_err(|e| ProcessError::ResponseParse {
            details: e.to_string(),
        })
    }
}

/// Stage 1 of response cleanup: return the content of the first fenced code
/// block if one is present (with or without a `json` language tag), or the
/// trimmed response unchanged otherwise.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let body = after.trim_start();
    let end = body.find("```").unwrap_or(body.len());
    body[..end].trim()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_response() -> String {
        json!({
            "case_number": "WP-1234/2023",
            "petitioner_name": "A. Kumar",
            "respondent_name": "State Transport Authority",
            "city": "Pune",
            "petitioner_issues": ["Permit cancelled without notice"],
            "respondent_issues": ["Permit conditions were violated"],
            "hearing_points": ["Notice records were produced", "Violation log examined"],
            "final_decision": "Petition allowed, permit restored.",
            "is_appeal": false,
            "appeal_subject": null,
            "appeal_decision": null
        })
        .to_string()
    }

    #[test]
    fn strips_json_fence() {
        let wrapped = format!("```json\n{}\n```", "{\"a\": 1}");
        assert_eq!(strip_code_fence(&wrapped), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let wrapped = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(wrapped), "{\"a\": 1}");
    }

    #[test]
    fn strips_fence_after_leading_prose() {
        let wrapped = "Here is the extraction:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(strip_code_fence(wrapped), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_response_passes_through() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parses_complete_response() {
        let doc = InformationExtractor::parse_response(&complete_response()).unwrap();
        assert_eq!(doc.case_number, "WP-1234/2023");
        assert_eq!(doc.hearing_points.len(), 2);
        assert!(!doc.is_appeal);
        assert!(doc.appeal_subject.is_none());
    }

    #[test]
    fn parses_fenced_response() {
        let wrapped = format!("```json\n{}\n```", complete_response());
        assert!(InformationExtractor::parse_response(&wrapped).is_ok());
    }

    #[test]
    fn missing_fields_are_all_named() {
        let mut value: Value = serde_json::from_str(&complete_response()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("city");
        object.remove("final_decision");

        let err = InformationExtractor::parse_response(&value.to_string()).unwrap_err();
        match err {
            ProcessError::MissingFields { fields } => {
                assert_eq!(fields, vec!["city".to_string(), "final_decision".to_string()]);
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn bare_string_list_field_is_lifted() {
        let mut value: Value = serde_json::from_str(&complete_response()).unwrap();
        value["petitioner_issues"] = json!("Single issue as a plain string");

        let doc = InformationExtractor::parse_response(&value.to_string()).unwrap();
        assert_eq!(
            doc.petitioner_issues,
            vec!["Single issue as a plain string".to_string()]
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = InformationExtractor::parse_response("not json at all").unwrap_err();
        assert!(matches!(err, ProcessError::ResponseParse { .. }));
    }

    #[test]
    fn non_object_json_is_a_parse_error() {
        let err = InformationExtractor::parse_response("[1, 2, 3]").unwrap_err();
        match err {
            ProcessError::ResponseParse { details } => assert!(details.contains("an array")),
            other => panic!("expected ResponseParse, got {:?}", other),
        }
    }

    #[test]
    fn appeal_fields_accept_values() {
        let mut value: Value = serde_json::from_str(&complete_response()).unwrap();
        value["is_appeal"] = json!(true);
        value["appeal_subject"] = json!("Against the permit restoration order");
        value["appeal_decision"] = json!("Appeal dismissed");

        let doc = InformationExtractor::parse_response(&value.to_string()).unwrap();
        assert!(doc.is_appeal);
        assert_eq!(
            doc.appeal_subject.as_deref(),
            Some("Against the permit restoration order")
        );
    }
}

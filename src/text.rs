//! # Text Normalization Module
//!
//! ## Purpose
//! Normalization and tokenization used to derive comparable document
//! representations for the similarity index.
//!
//! ## Input/Output Specification
//! - **Input**: Raw extracted document text
//! - **Output**: Normalized text, lowercase alphanumeric tokens
//! - **Guarantees**: Deterministic; identical input yields identical tokens
//!
//! ## Key Features
//! - Unicode NFC normalization
//! - Case folding and whitespace collapsing
//! - Alphanumeric tokenization (punctuation discarded)

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("static token pattern"))
}

/// Normalize text: NFC composition, lowercase, collapsed whitespace.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let lowered = composed.to_lowercase();
    whitespace_regex()
        .replace_all(lowered.trim(), " ")
        .into_owned()
}

/// Split normalized text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    token_regex()
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  The\tCourt\n\nFINDS "), "the court finds");
    }

    #[test]
    fn tokenize_drops_punctuation() {
        assert_eq!(
            tokenize("Case No. 42/2023, decided."),
            vec!["case", "no", "42", "2023", "decided"]
        );
    }

    #[test]
    fn tokenize_is_deterministic() {
        let text = "Pétitioner raised three issues";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}

//! # Document Embedding Module
//!
//! ## Purpose
//! Derives fixed-dimension vector representations of document text for the
//! similarity index. The embedding scheme sits behind a trait so it can be
//! replaced (e.g. by a model-backed embedder) without touching the store.
//!
//! ## Input/Output Specification
//! - **Input**: Raw document text
//! - **Output**: L2-normalized f32 vector of a fixed dimension
//! - **Guarantees**: Deterministic; identical text yields an identical vector
//!
//! ## Key Features
//! - Hashed bag-of-words term-frequency embedding (FNV-1a token hashing)
//! - Cosine similarity over normalized vectors

use crate::text;

/// Strategy for deriving a comparable vector from document text.
pub trait Embedder: Send + Sync {
    /// Embed text into a vector of `dimension()` components.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Output vector dimension.
    fn dimension(&self) -> usize;
}

/// Deterministic hashed bag-of-words embedder.
///
/// Each token is hashed with FNV-1a into one of `dimension` buckets; bucket
/// counts form a term-frequency vector which is then L2-normalized. FNV is
/// used instead of the standard library hasher so vectors stay stable across
/// builds and platforms.
pub struct HashingEmbedder {
    dimension: usize,
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_token(token: &str) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for byte in token.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, input: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text::tokenize(input) {
            let bucket = (Self::hash_token(&token) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        normalize_vector(&mut vector);
        vector
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub fn normalize_vector(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity of two vectors. Mismatched lengths or zero vectors
/// score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        let text = "The petitioner raised three issues before the court";
        assert_eq!(embedder.embed(text), embedder.embed(text));
    }

    #[test]
    fn embedding_is_unit_length() {
        let embedder = HashingEmbedder::new(64);
        let vector = embedder.embed("final decision of the appellate court");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn identical_text_has_maximal_similarity() {
        let embedder = HashingEmbedder::new(128);
        let a = embedder.embed("hearing points of the case");
        let b = embedder.embed("hearing points of the case");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn disjoint_text_scores_lower_than_identical() {
        let embedder = HashingEmbedder::new(256);
        let a = embedder.embed("property boundary dispute in the northern district");
        let b = embedder.embed("custody arrangement for the minor children");
        let sim = cosine_similarity(&a, &embedder.embed("property boundary dispute"));
        let cross = cosine_similarity(&a, &b);
        assert!(sim > cross);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(32);
        let vector = embedder.embed("");
        assert!(vector.iter().all(|v| *v == 0.0));
        assert_eq!(cosine_similarity(&vector, &vector), 0.0);
    }
}

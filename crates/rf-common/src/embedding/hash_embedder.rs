use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::Embedder;

/// Fixed seeds keep the hashing deterministic across runs and Rust
/// versions. Changing either value changes every embedding; bump
/// `version()` with it.
const HASH_SEED_K0: u64 = 0x6d61_7463_685f_7631;
const HASH_SEED_K1: u64 = 0x7265_6372_7569_7431;

/// Deterministic feature-hashing embedder.
///
/// Stands in for the sentence-transformer backend in tests and offline
/// runs: no model download, O(tokens) per text, and stable vectors for
/// identical inputs. Token overlap still translates into cosine
/// similarity, which is all the match features need from a fallback.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        "v1"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in Self::tokenize(text) {
            let idx = self.hash_token(&token);
            // Sign hashing keeps expected dot products of unrelated texts
            // near zero.
            let sign = if self.hash_token(&format!("{token}_sign")) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

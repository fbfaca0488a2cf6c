pub mod hash_embedder;

pub use hash_embedder::HashEmbedder;

use std::collections::HashMap;

use tracing::warn;

/// Sentence-embedding backend used for the semantic match features.
///
/// The pipeline treats the model as a black box text → vector; which model
/// sits behind the trait is an operator choice. `name()` and `version()`
/// identify the backend in diagnostics so scored tables can be compared
/// across model generations.
pub trait Embedder {
    fn name(&self) -> &'static str;

    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Vec<f32>;

    /// Whole-column encoding; override when the backend can amortize
    /// model-invocation overhead across a batch.
    fn encode_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Raw cosine similarity in [-1.0, 1.0].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Process-lifetime text → vector cache, single-writer, never invalidated
/// within a run.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: HashMap<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Batch-encode every text not yet cached. Called once per column of
    /// texts before row-wise scoring, so the backend sees one batch instead
    /// of one call per row.
    pub fn warm(&mut self, embedder: &dyn Embedder, texts: &[&str]) {
        let fresh: Vec<&str> = {
            let mut seen = std::collections::HashSet::new();
            texts
                .iter()
                .copied()
                .filter(|t| !t.is_empty() && !self.entries.contains_key(*t) && seen.insert(*t))
                .collect()
        };
        if fresh.is_empty() {
            return;
        }
        let vectors = embedder.encode_batch(&fresh);
        for (text, vector) in fresh.into_iter().zip(vectors) {
            self.entries.insert(text.to_string(), vector);
        }
    }

    pub fn embed(&mut self, embedder: &dyn Embedder, text: &str) -> Vec<f32> {
        if let Some(vector) = self.entries.get(text) {
            return vector.clone();
        }
        let vector = embedder.encode(text);
        self.entries.insert(text.to_string(), vector.clone());
        vector
    }

    /// Cosine similarity of two texts through the cache.
    pub fn similarity(&mut self, embedder: &dyn Embedder, a: &str, b: &str) -> f32 {
        let va = self.embed(embedder, a);
        let vb = self.embed(embedder, b);
        cosine_similarity(&va, &vb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn cosine_similarity_is_one_for_identical_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_is_negative_for_opposed_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_returns_zero_on_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    struct CountingEmbedder {
        calls: Cell<usize>,
    }

    impl Embedder for CountingEmbedder {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn version(&self) -> &str {
            "test"
        }
        fn dimension(&self) -> usize {
            2
        }
        fn encode(&self, text: &str) -> Vec<f32> {
            self.calls.set(self.calls.get() + 1);
            vec![text.len() as f32, 1.0]
        }
    }

    #[test]
    fn cache_encodes_each_text_once() {
        let embedder = CountingEmbedder { calls: Cell::new(0) };
        let mut cache = EmbeddingCache::default();
        cache.embed(&embedder, "engineering");
        cache.embed(&embedder, "engineering");
        cache.similarity(&embedder, "engineering", "finance");
        assert_eq!(embedder.calls.get(), 2);
    }

    #[test]
    fn warm_skips_cached_and_duplicate_texts() {
        let embedder = CountingEmbedder { calls: Cell::new(0) };
        let mut cache = EmbeddingCache::default();
        cache.embed(&embedder, "a");
        cache.warm(&embedder, &["a", "b", "b", ""]);
        assert_eq!(embedder.calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }
}

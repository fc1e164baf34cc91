//! The `Embedder` collaborator (spec §6): batched, fixed-dimensionality,
//! deterministic-for-identical-input text embedding.
//!
//! Production callers supply their own [`Embedder`] wrapping a real model;
//! this crate ships [`DeterministicHashEmbedder`] so the rest of the
//! workspace (and its tests) has a concrete implementation with no network
//! dependency.

use async_trait::async_trait;
use docsforge_shared::Result;

/// Turns text into fixed-length float vectors for vector search.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimensions(&self) -> usize;
}

/// A deterministic embedder with no external dependency: each dimension is
/// a hash of overlapping token shingles, L2-normalized so cosine similarity
/// behaves sensibly. Not semantically meaningful, but stable, batched, and
/// side-effect free — exactly what the interface promises.
pub struct DeterministicHashEmbedder {
    dimensions: usize,
}

impl DeterministicHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        assert!(dimensions > 0, "dimensions must be > 0");
        Self { dimensions }
    }
}

impl Default for DeterministicHashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn embed_one(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dimensions];
    let normalized = text.to_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    if tokens.is_empty() {
        return vec;
    }

    for window in tokens.windows(2.min(tokens.len())) {
        let shingle = window.join(" ");
        let h = fnv1a(shingle.as_bytes());
        let idx = (h as usize) % dimensions;
        let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        vec[idx] += sign;
    }
    for token in &tokens {
        let h = fnv1a(token.as_bytes());
        let idx = (h as usize) % dimensions;
        vec[idx] += 1.0;
    }

    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vec {
            *v /= norm;
        }
    }
    vec
}

#[async_trait]
impl Embedder for DeterministicHashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| embed_one(t, self.dimensions))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

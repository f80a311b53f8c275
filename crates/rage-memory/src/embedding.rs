use async_trait::async_trait;
use rage_core::{RageError, RageResult};
use std::collections::HashMap;

/// Embedding dimension used when none is configured.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Trait for computing text embeddings (vector representations).
///
/// The memory store never calls this; it is the seam callers use to turn
/// queries and documents into vectors before handing them to
/// [`MemoryManager`](crate::MemoryManager).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute embedding vector for a single text.
    async fn embed(&self, text: &str) -> RageResult<Vec<f32>>;

    /// Compute embeddings for a batch of texts.
    async fn embed_batch(&self, texts: &[&str]) -> RageResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimension of the embedding vectors produced by this provider.
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hashing embedding; needs no model or network.
///
/// Words and adjacent word pairs are hashed into signed buckets and the
/// result is L2-normalised, so texts sharing vocabulary land close together
/// under Euclidean distance.
pub struct LocalEmbedding {
    dimension: usize,
}

impl LocalEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

impl Default for LocalEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedding {
    async fn embed(&self, text: &str) -> RageResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RageError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 1)
            .collect();

        let mut features: HashMap<String, f32> = HashMap::new();
        for word in &words {
            *features.entry((*word).to_string()).or_insert(0.0) += 1.0;
        }
        for pair in words.windows(2) {
            *features.entry(format!("{} {}", pair[0], pair[1])).or_insert(0.0) += 0.5;
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (feature, weight) in &features {
            let hash = fnv1a(feature.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// 64-bit FNV-1a.
fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in data {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

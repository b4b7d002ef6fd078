//! Deterministic feature-hashing embeddings.
//!
//! Every lowercase word token is hashed into one of `dimensions` buckets with a
//! hash-derived sign, and the accumulated vector is L2-normalized. Texts sharing
//! vocabulary land close together, identical texts map to identical vectors, and
//! nothing touches the network. Used as the offline default and as a fixed-vector
//! double in tests.
//!
//! Tokens are hashed with 64-bit FNV-1a, so a given text maps to the same vector
//! on every platform and toolchain.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tracing::debug;

use super::EmbeddingError;
use super::EmbeddingProvider;
use super::EmbeddingVector;

pub const DEFAULT_HASHED_DIMENSIONS: usize = 512;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug)]
pub struct HashedEmbeddings {
    dimensions: usize,
    loaded: AtomicBool,
}

impl HashedEmbeddings {
    pub const fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Embed one text without the load check.
    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }

        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashedEmbeddings {
    fn default() -> Self {
        Self::new(DEFAULT_HASHED_DIMENSIONS)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for HashedEmbeddings {
    fn model_id(&self) -> String {
        format!("hashed:{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn load(&self) -> Result<(), EmbeddingError> {
        self.loaded.store(true, Ordering::Release);
        debug!(dimensions = self.dimensions, "hashed embeddings ready");
        Ok(())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if !self.is_loaded() {
            return Err(EmbeddingError::NotLoaded);
        }
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

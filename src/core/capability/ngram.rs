//! Hashed character-trigram embedder.
//!
//! Lowercases the chunk, hashes every character trigram (FNV-1a)
//! into a fixed number of buckets and L2-normalizes the counts.
//! Deterministic and dependency-free; vectors have the same width as
//! the MiniLM-style indexes they are typically loaded next to.

use super::{Capability, ChunkRequest};
use crate::core::error::CapabilityError;
use crate::core::types::{ChunkResult, OutputKind};

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 1469598103934665603;
const FNV_PRIME: u64 = 1099511628211;

#[derive(Debug, Clone, Copy)]
pub struct NgramEmbedder {
    pub dimensions: usize,
}

impl Default for NgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl NgramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        for window in chars.windows(3) {
            let mut hash = FNV_OFFSET;
            let mut buf = [0u8; 4];
            for ch in window {
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(FNV_PRIME);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

impl Capability for NgramEmbedder {
    fn name(&self) -> &str {
        "ngram"
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Embedding
    }

    fn process(&self, request: &ChunkRequest<'_>) -> Result<ChunkResult, CapabilityError> {
        Ok(ChunkResult::Vector(self.embed(request.text)))
    }
}

//! Local feature-hashing embedder

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use mole_core::{Embedder, Error, Language, Result};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("valid token pattern"));

/// Deterministic bag-of-words embedder.
///
/// Every lowercased token adds one to the bucket picked by its MD5 digest and
/// the result is scaled to unit length. It needs no network access, which
/// makes it the default for offline use and for tests.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
        }
    }

    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed one text synchronously
    pub fn embed_text(&self, text: &str, language: Language) -> Vec<f32> {
        let lowered = language.lowercase(text);
        let mut vector = vec![0.0f32; self.dimension];

        for token in TOKEN.find_iter(&lowered) {
            vector[self.bucket(token.as_str())] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = md5::compute(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.0[..8]);
        (u64::from_le_bytes(bytes) % self.dimension as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_id(&self, language: Language) -> String {
        format!("hash-{}-{}", self.dimension, language.code())
    }

    async fn embed_batch(&self, texts: &[&str], language: Language) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.embed_text(text, language))
            .collect())
    }
}

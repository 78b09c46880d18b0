//! Common types used across the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use uuid::Uuid;

use crate::{Error, Result};

/// A contiguous span of a document's text sized for embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Id of the document the span was cut from
    pub document_id: Uuid,
    /// Position of the chunk in document order
    pub ordinal: usize,
    /// Byte offsets into the document text
    pub range: Range<usize>,
    pub text: String,
}

/// Vector representation of one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Ordinal of the embedded chunk
    pub chunk: usize,
    pub vector: Vec<f32>,
}

/// A chunk together with its similarity to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// The model's response to a question, with the context it was given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    /// Chunks sent to the model, in ranked order
    pub context: Vec<Chunk>,
    pub text: String,
    pub model_id: String,
}

/// One question/answer round of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub sources: Vec<usize>,
    pub asked_at: DateTime<Utc>,
}

impl Exchange {
    pub fn from_answer(answer: &Answer) -> Self {
        Self {
            question: answer.question.clone(),
            answer: answer.text.clone(),
            sources: answer.context.iter().map(|chunk| chunk.ordinal).collect(),
            asked_at: Utc::now(),
        }
    }
}

/// Configuration for splitting documents into chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks
    pub overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    /// Reject sizes that would stall or overflow the splitter
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Order of chunks that score exactly the same
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earlier chunks first
    #[default]
    ChunkOrder,
    /// Later chunks first
    ReverseChunkOrder,
}

/// How the answer context is cut down to `max_context_chars`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// Drop whole chunks from the bottom of the ranking
    #[default]
    DropLowestRanked,
    /// Keep rank order and clip the first chunk that overflows
    ClipLast,
}

/// Configuration for retrieval and context assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    pub top_k: usize,
    /// Upper bound on the context handed to the model
    pub max_context_chars: usize,
    pub tie_break: TieBreak,
    pub truncation: Truncation,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: 4000,
            tie_break: TieBreak::default(),
            truncation: Truncation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_config_validation() {
        assert!(ChunkingConfig::default().validate().is_ok());
        assert!(ChunkingConfig::new(40, 0).validate().is_ok());
        assert!(matches!(
            ChunkingConfig::new(0, 0).validate(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ChunkingConfig::new(100, 100).validate(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_context_chars, 4000);
        assert_eq!(config.tie_break, TieBreak::ChunkOrder);
        assert_eq!(config.truncation, Truncation::DropLowestRanked);
    }

    #[test]
    fn test_exchange_records_source_ordinals() {
        let document_id = Uuid::new_v4();
        let chunk = |ordinal: usize| Chunk {
            document_id,
            ordinal,
            range: 0..1,
            text: "x".to_string(),
        };
        let answer = Answer {
            question: "why?".to_string(),
            context: vec![chunk(3), chunk(0)],
            text: "because".to_string(),
            model_id: "test".to_string(),
        };

        let exchange = Exchange::from_answer(&answer);
        assert_eq!(exchange.question, "why?");
        assert_eq!(exchange.answer, "because");
        assert_eq!(exchange.sources, vec![3, 0]);
    }

    #[test]
    fn test_config_serializes_snake_case() {
        let json = serde_json::to_value(RetrievalConfig::default()).unwrap();
        assert_eq!(json["tie_break"], "chunk_order");
        assert_eq!(json["truncation"], "drop_lowest_ranked");
    }
}

//! In-memory embedding index for one document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mole_core::{Chunk, Document, Embedding, Language};

/// A chunk with the vector it was embedded to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

/// Searchable chunks of the current document.
///
/// An index remembers the embedding model and language it was built with;
/// questions must be embedded the same way to be comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    document: Option<Document>,
    entries: Vec<IndexEntry>,
    model_id: String,
    language: Language,
    built_at: DateTime<Utc>,
}

impl Index {
    /// An index with nothing in it
    pub fn empty(model_id: impl Into<String>, language: Language) -> Self {
        Self {
            document: None,
            entries: Vec::new(),
            model_id: model_id.into(),
            language,
            built_at: Utc::now(),
        }
    }

    pub(crate) fn new(
        document: Document,
        entries: Vec<IndexEntry>,
        model_id: String,
        language: Language,
    ) -> Self {
        Self {
            document: Some(document),
            entries,
            model_id,
            language,
            built_at: Utc::now(),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|entry| &entry.chunk)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by every entry
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.embedding.vector.len())
    }

    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.document.as_ref().map(|d| d.url.as_str()),
            "title": self.document.as_ref().and_then(|d| d.title.as_deref()),
            "chunks": self.entries.len(),
            "characters": self.document.as_ref().map_or(0, Document::char_count),
            "model_id": self.model_id,
            "language": self.language.code(),
            "dimension": self.dimension(),
            "built_at": self.built_at.to_rfc3339(),
        })
    }
}

/// Cosine similarity of two vectors; zero when either has no length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

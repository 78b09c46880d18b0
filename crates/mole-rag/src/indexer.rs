//! Builds an index from a document and ranks its chunks against questions

use std::sync::Arc;
use tracing::{debug, info};

use mole_core::{
    Chunk, ChunkingConfig, Document, Embedder, Embedding, Error, Language, Result, ScoredChunk,
    TieBreak,
};

use crate::chunker::TextChunker;
use crate::index::{cosine_similarity, Index, IndexEntry};

/// Chunks and embeds documents, and answers similarity queries
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
    language: Language,
    tie_break: TieBreak,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, chunking: ChunkingConfig, language: Language) -> Result<Self> {
        Ok(Self {
            embedder,
            chunker: TextChunker::new(chunking)?,
            language,
            tie_break: TieBreak::default(),
        })
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Model id new indexes are built with
    pub fn model_id(&self) -> String {
        self.embedder.model_id(self.language)
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        self.chunker.config()
    }

    /// Chunk and embed `document`
    pub async fn build(&self, document: Document) -> Result<Index> {
        let chunks = self.chunker.chunk(&document);
        if chunks.is_empty() {
            return Err(Error::EmptyContent {
                url: document.url.clone(),
            });
        }
        debug!("Split {} into {} chunks", document.url, chunks.len());

        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts, self.language)
            .await
            .map_err(into_embedding_error)?;
        check_vectors(&vectors, chunks.len())?;

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                embedding: Embedding {
                    chunk: chunk.ordinal,
                    vector,
                },
                chunk,
            })
            .collect::<Vec<_>>();

        let model_id = self.model_id();
        info!(
            "Indexed {} chunks of {} with {}",
            entries.len(),
            document.url,
            model_id
        );
        Ok(Index::new(document, entries, model_id, self.language))
    }

    /// The `k` chunks most similar to `question`, best first
    pub async fn query(&self, index: &Index, question: &str, k: usize) -> Result<Vec<Chunk>> {
        Ok(self
            .search(index, question, k)
            .await?
            .into_iter()
            .map(|scored| scored.chunk)
            .collect())
    }

    /// Like [`Indexer::query`], keeping the similarity scores
    pub async fn search(&self, index: &Index, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let model_id = self.embedder.model_id(index.language());
        if model_id != index.model_id() {
            return Err(Error::Embedding(format!(
                "index was built with {} but questions are embedded with {}",
                index.model_id(),
                model_id
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(question, index.language())
            .await
            .map_err(into_embedding_error)?;
        if Some(query.len()) != index.dimension() {
            return Err(Error::Embedding(format!(
                "question vector has {} dimensions, index has {}",
                query.len(),
                index.dimension().unwrap_or_default()
            )));
        }

        let mut scored: Vec<ScoredChunk> = index
            .entries()
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query, &entry.embedding.vector),
            })
            .collect();

        let tie_break = self.tie_break;
        scored.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then_with(|| {
                let order = a.chunk.ordinal.cmp(&b.chunk.ordinal);
                match tie_break {
                    TieBreak::ChunkOrder => order,
                    TieBreak::ReverseChunkOrder => order.reverse(),
                }
            })
        });
        scored.truncate(k);

        debug!(
            "Top chunks: {:?}",
            scored
                .iter()
                .map(|s| (s.chunk.ordinal, s.score))
                .collect::<Vec<_>>()
        );
        Ok(scored)
    }
}

fn into_embedding_error(err: Error) -> Error {
    match err {
        Error::Embedding(_) => err,
        other => Error::Embedding(other.to_string()),
    }
}

fn check_vectors(vectors: &[Vec<f32>], expected: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::Embedding(format!(
            "expected {} vectors, embedder returned {}",
            expected,
            vectors.len()
        )));
    }

    let dimension = vectors.first().map_or(0, Vec::len);
    if dimension == 0 {
        return Err(Error::Embedding("embedder returned an empty vector".to_string()));
    }
    if let Some(position) = vectors.iter().position(|v| v.len() != dimension) {
        return Err(Error::Embedding(format!(
            "vector {} has {} dimensions, expected {}",
            position,
            vectors[position].len(),
            dimension
        )));
    }
    Ok(())
}

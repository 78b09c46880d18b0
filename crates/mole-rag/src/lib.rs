//! Retrieval-augmented answering over a scraped page
//!
//! [`Indexer`] splits a document into chunks and embeds them into an
//! [`Index`]; [`Answerer`] retrieves the best chunks for a question and asks
//! the text generator; [`Session`] ties both to a document source and keeps
//! exactly one live index per user.

mod answerer;
mod chunker;
mod embedder;
mod index;
mod indexer;
pub mod prompt;
mod session;


pub use answerer::{build_context, Answerer, Context};
pub use chunker::TextChunker;
pub use embedder::HashEmbedder;
pub use index::{cosine_similarity, Index, IndexEntry};
pub use indexer::Indexer;
pub use session::{ScrapeReport, Session};

// Re-export core types for convenience
pub use mole_core::{
    Answer, Chunk, ChunkingConfig, Document, DocumentSource, Embedder, Error, Exchange, Language,
    Result, RetrievalConfig, ScoredChunk, TextGenerator, TieBreak, Truncation,
};

//! Hosted model providers for mole
//!
//! This crate provides [`TextGenerator`] implementations for OpenAI-style
//! chat endpoints and Anthropic, and an [`Embedder`] for OpenAI-style
//! embedding endpoints.

mod client;
mod config;
mod embeddings;

#[cfg(test)]
mod tests;

pub use client::{build_generator, AnthropicClient, OpenAiCompatibleClient};
pub use config::{EmbeddingConfig, LlmConfig, ProviderKind};
pub use embeddings::OpenAiEmbedder;

// Re-export core types for convenience
pub use mole_core::{Embedder, Error, GenerationRequest, GenerationResult, Result, TextGenerator};

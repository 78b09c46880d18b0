//! Core traits and types for mole
//!
//! This crate defines the data model of the scrape → index → answer pipeline
//! and the narrow capability traits through which the pipeline reaches the
//! network, the embedding model and the text-generation model.

pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod types;
pub mod web;

pub use document::{Document, DocumentSource};
pub use embedding::{Embedder, Language};
pub use error::{Error, Result};
pub use llm::{GenerationRequest, GenerationResult, TextGenerator};
pub use types::*;
pub use web::{AllowAll, ExclusionPolicy, PageRenderer, RenderedPage};

//! Text-generation capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A single generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Optional system instruction
    pub system: Option<String>,
    /// The rendered user prompt
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Create a request with the default sampling settings
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            system: None,
            prompt: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers (OpenAI, Anthropic, Groq, ...)
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `request`
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}

//! Provider configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use mole_core::{Error, Language, Result};

const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Hosted model companies mole can talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Groq,
    Anthropic,
    HuggingFace,
}

impl ProviderKind {
    pub fn all() -> Vec<ProviderKind> {
        vec![
            ProviderKind::OpenAi,
            ProviderKind::Groq,
            ProviderKind::Anthropic,
            ProviderKind::HuggingFace,
        ]
    }

    pub fn parse(s: &str) -> Option<ProviderKind> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "groq" => Some(ProviderKind::Groq),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "huggingface" | "hf" => Some(ProviderKind::HuggingFace),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::HuggingFace => "huggingface",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Groq => "llama3-8b-8192",
            ProviderKind::Anthropic => "claude-3-haiku-20240307",
            ProviderKind::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => OPENAI_URL,
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::HuggingFace => "https://router.huggingface.co/v1",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::HuggingFace => "HF_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for a text-generation client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Create configuration with the provider's defaults
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }

    /// Create configuration from environment variables, reading `.env` first
    pub fn from_env(provider: Option<ProviderKind>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(provider, |key| env::var(key).ok())
    }

    /// Create configuration from a variable lookup.
    ///
    /// `provider` overrides `MOLE_PROVIDER`.
    pub fn from_vars(
        provider: Option<ProviderKind>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let provider = match provider {
            Some(provider) => provider,
            None => match non_empty(&var, "MOLE_PROVIDER") {
                Some(name) => ProviderKind::parse(&name).ok_or_else(|| {
                    Error::Configuration(format!(
                        "unknown provider '{}', expected one of: openai, groq, anthropic, huggingface",
                        name
                    ))
                })?,
                None => ProviderKind::default(),
            },
        };

        let api_key = non_empty(&var, provider.api_key_var()).ok_or_else(|| {
            Error::Configuration(format!(
                "{} environment variable not found",
                provider.api_key_var()
            ))
        })?;

        let mut config = Self::new(provider, api_key);
        if let Some(model) = non_empty(&var, "MOLE_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = non_empty(&var, "MOLE_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration(format!("missing {} API key", self.provider)));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("model name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Configuration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 || self.timeout_secs == 0 {
            return Err(Error::Configuration(
                "max_tokens and timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the OpenAI-compatible embedding client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub english_model: String,
    pub turkish_model: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_URL.to_string(),
            english_model: "text-embedding-ada-002".to_string(),
            turkish_model: "text-embedding-3-large".to_string(),
            batch_size: 100,
            timeout_secs: 60,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = non_empty(&var, "OPENAI_API_KEY").ok_or_else(|| {
            Error::Configuration(
                "OPENAI_API_KEY environment variable not found (needed for remote embeddings)"
                    .to_string(),
            )
        })?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_empty(&var, "MOLE_EMBEDDING_MODEL_EN") {
            config.english_model = model;
        }
        if let Some(model) = non_empty(&var, "MOLE_EMBEDDING_MODEL_TR") {
            config.turkish_model = model;
        }
        Ok(config)
    }

    /// Embedding model used for `language`
    pub fn model_for(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english_model,
            Language::Turkish => &self.turkish_model,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn non_empty(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    var(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

//! OpenAI-compatible embeddings client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mole_core::{Embedder, Error, Language, Result};

use crate::client::{bearer_headers, read_body};
use crate::config::{EmbeddingConfig, ProviderKind};

/// Embeds text through a `/embeddings` endpoint, picking the model by language
pub struct OpenAiEmbedder {
    config: EmbeddingConfig,
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Configuration("missing embeddings API key".to_string()));
        }
        if config.batch_size == 0 {
            return Err(Error::Configuration(
                "embedding batch size must be positive".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(bearer_headers(&config.api_key)?)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build embeddings HTTP client: {}", e)))?;
        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));

        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    async fn embed_chunk(&self, inputs: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding {} texts with {}", inputs.len(), model);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model, input: inputs })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embeddings request failed: {}", e)))?;

        let body = read_body(ProviderKind::OpenAi, response)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;
        parse_embeddings(&body, inputs.len())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_id(&self, language: Language) -> String {
        self.config.model_for(language).to_string()
    }

    async fn embed_batch(&self, texts: &[&str], language: Language) -> Result<Vec<Vec<f32>>> {
        let model = self.config.model_for(language);
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size) {
            vectors.extend(self.embed_chunk(batch, model).await?);
        }
        Ok(vectors)
    }
}

/// Decode an embeddings response into vectors in input order
pub(crate) fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| Error::Embedding(format!("malformed embeddings response: {}", e)))?;

    if parsed.data.len() != expected {
        return Err(Error::Embedding(format!(
            "received {} embeddings for {} inputs",
            parsed.data.len(),
            expected
        )));
    }

    parsed.data.sort_by_key(|entry| entry.index);
    if let Some((position, entry)) = parsed
        .data
        .iter()
        .enumerate()
        .find(|(position, entry)| entry.index != *position)
    {
        return Err(Error::Embedding(format!(
            "embedding index {} found where {} was expected",
            entry.index, position
        )));
    }
    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
}

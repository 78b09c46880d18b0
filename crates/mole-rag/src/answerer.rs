//! Retrieval-augmented answering, summaries and key points

use std::sync::Arc;
use tracing::{debug, info};

use mole_core::{
    Answer, Chunk, Error, GenerationRequest, Result, RetrievalConfig, TextGenerator, Truncation,
};

use crate::index::Index;
use crate::indexer::Indexer;
use crate::prompt;

/// Context handed to the model and the chunks it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub text: String,
    pub chunks: Vec<Chunk>,
}

/// Turns retrieved chunks into prompts and prompts into answers
pub struct Answerer {
    indexer: Arc<Indexer>,
    generator: Arc<dyn TextGenerator>,
    config: RetrievalConfig,
    temperature: f32,
    max_tokens: u32,
}

impl Answerer {
    pub fn new(
        indexer: Arc<Indexer>,
        generator: Arc<dyn TextGenerator>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        if config.max_context_chars == 0 {
            return Err(Error::Configuration(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }

        let defaults = GenerationRequest::default();
        Ok(Self {
            indexer,
            generator,
            config,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn indexer(&self) -> &Arc<Indexer> {
        &self.indexer
    }

    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    /// Answer `question` from the best-matching chunks of `index`
    pub async fn answer(&self, index: &Index, question: &str) -> Result<Answer> {
        let ranked = self.indexer.query(index, question, self.config.top_k).await?;
        let context = build_context(&ranked, self.config.max_context_chars, self.config.truncation);
        debug!(
            "Context of {} chars from {} of {} retrieved chunks",
            context.text.chars().count(),
            context.chunks.len(),
            ranked.len()
        );

        let (text, model_id) = self
            .generate(prompt::answer_prompt(&context.text, question))
            .await?;

        Ok(Answer {
            question: question.to_string(),
            context: context.chunks,
            text,
            model_id,
        })
    }

    /// Summarise the whole document, refining one window at a time
    pub async fn summarize(&self, index: &Index) -> Result<String> {
        let windows = self.windows(index)?;
        info!("Summarizing {} windows", windows.len());

        let mut summary: Option<String> = None;
        for window in &windows {
            let prompt = match &summary {
                None => prompt::summary_prompt(window),
                Some(existing) => prompt::refine_prompt(existing, window),
            };
            summary = Some(self.generate(prompt).await?.0);
        }
        Ok(summary.unwrap_or_default())
    }

    /// Key points of the whole document: one list per window, then merged
    pub async fn key_points(&self, index: &Index) -> Result<String> {
        let windows = self.windows(index)?;
        info!("Extracting key points from {} windows", windows.len());

        let mut lists = Vec::with_capacity(windows.len());
        for window in &windows {
            lists.push(self.generate(prompt::key_points_prompt(window)).await?.0);
        }

        if lists.len() == 1 {
            return Ok(lists.remove(0));
        }
        Ok(self.generate(prompt::merge_key_points_prompt(&lists)).await?.0)
    }

    /// Chunk texts in document order, packed into windows of at most
    /// `max_context_chars`
    fn windows(&self, index: &Index) -> Result<Vec<String>> {
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let max = self.config.max_context_chars;
        let mut windows = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for chunk in index.chunks() {
            let text = clip(&chunk.text, max);
            let len = text.chars().count();
            if !current.is_empty() && current_len + 2 + len > max {
                windows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push_str("\n\n");
                current_len += 2;
            }
            current.push_str(&text);
            current_len += len;
        }
        if !current.is_empty() {
            windows.push(current);
        }
        Ok(windows)
    }

    async fn generate(&self, prompt: String) -> Result<(String, String)> {
        let request = GenerationRequest::new(prompt).with_sampling(self.temperature, self.max_tokens);
        let result = self.generator.generate(&request).await.map_err(|e| match e {
            Error::Generation(_) | Error::Configuration(_) => e,
            other => Error::Generation(other.to_string()),
        })?;
        if let Some(tokens) = result.tokens_used {
            debug!("{} used {} tokens", result.model_id, tokens);
        }
        Ok((result.text, result.model_id))
    }
}

/// Render ranked chunks as `[n] text` entries within `max_chars`
pub fn build_context(chunks: &[Chunk], max_chars: usize, truncation: Truncation) -> Context {
    let mut text = String::new();
    let mut used = Vec::new();
    let mut len = 0;

    for (rank, chunk) in chunks.iter().enumerate() {
        let entry = format!("[{}] {}", rank + 1, chunk.text);
        let entry_len = entry.chars().count();
        let separator = if used.is_empty() { 0 } else { 2 };

        if len + separator + entry_len <= max_chars {
            if separator > 0 {
                text.push_str("\n\n");
            }
            text.push_str(&entry);
            len += separator + entry_len;
            used.push(chunk.clone());
            continue;
        }

        let clip_to = match truncation {
            // Only the top chunk is ever clipped
            Truncation::DropLowestRanked if used.is_empty() => max_chars,
            Truncation::DropLowestRanked => 0,
            Truncation::ClipLast => max_chars.saturating_sub(len + separator),
        };
        if clip_to > 0 {
            if separator > 0 {
                text.push_str("\n\n");
            }
            text.push_str(&clip(&entry, clip_to));
            used.push(chunk.clone());
        }
        break;
    }

    Context { text, chunks: used }
}

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

//! A user's scrape-and-ask session

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use mole_core::{Answer, DocumentSource, Error, Exchange, Result};

use crate::answerer::Answerer;
use crate::index::Index;

/// Outcome of a successful scrape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub url: String,
    pub title: Option<String>,
    pub chunks: usize,
    pub characters: usize,
    pub model_id: String,
}

/// Owns the live index of one user and the questions asked against it.
///
/// At most one index is live. Scraping a new URL discards the previous
/// index before anything is fetched.
pub struct Session {
    id: Uuid,
    source: Arc<dyn DocumentSource>,
    answerer: Answerer,
    index: Option<Index>,
    history: Vec<Exchange>,
    last_answer: Option<Answer>,
}

impl Session {
    pub fn new(source: Arc<dyn DocumentSource>, answerer: Answerer) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            answerer,
            index: None,
            history: Vec::new(),
            last_answer: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fetch `url` and index it, replacing the current index
    pub async fn scrape(&mut self, url: &str) -> Result<ScrapeReport> {
        self.index = None;
        self.last_answer = None;

        let document = self.source.fetch(url).await?;
        let index = self.answerer.indexer().build(document).await?;

        let document = index.document();
        let report = ScrapeReport {
            url: document.map(|d| d.url.clone()).unwrap_or_else(|| url.to_string()),
            title: document.and_then(|d| d.title.clone()),
            chunks: index.len(),
            characters: document.map_or(0, |d| d.char_count()),
            model_id: index.model_id().to_string(),
        };
        info!("Session {} indexed {} ({} chunks)", self.id, report.url, report.chunks);

        self.index = Some(index);
        Ok(report)
    }

    /// Answer a question about the scraped page
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let index = self.index.as_ref().ok_or(Error::EmptyIndex)?;
        let answer = self.answerer.answer(index, question).await?;

        self.history.push(Exchange::from_answer(&answer));
        self.last_answer = Some(answer.clone());
        Ok(answer)
    }

    pub async fn summarize(&self) -> Result<String> {
        let index = self.index.as_ref().ok_or(Error::EmptyIndex)?;
        self.answerer.summarize(index).await
    }

    pub async fn key_points(&self) -> Result<String> {
        let index = self.index.as_ref().ok_or(Error::EmptyIndex)?;
        self.answerer.key_points(index).await
    }

    /// Drop the index and the question history
    pub fn reset(&mut self) {
        self.index = None;
        self.history.clear();
        self.last_answer = None;
        info!("Session {} reset", self.id);
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// The most recent answer, with the chunks it was based on
    pub fn last_answer(&self) -> Option<&Answer> {
        self.last_answer.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.index.as_ref().is_some_and(|index| !index.is_empty())
    }

    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "session": self.id.to_string(),
            "ready": self.is_ready(),
            "questions": self.history.len(),
            "generator": self.answerer.model_id(),
            "top_k": self.answerer.config().top_k,
            "max_context_chars": self.answerer.config().max_context_chars,
            "index": self.index.as_ref().map(Index::stats),
        })
    }
}

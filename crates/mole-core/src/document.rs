//! Scraped documents and the source trait that produces them

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Text extracted from one URL.
///
/// A document is immutable once created and is replaced wholesale when the
/// next URL is scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub retrieved_at: DateTime<Utc>,
    pub text: String,
}

impl Document {
    /// Create a document retrieved now
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title: None,
            retrieved_at: Utc::now(),
            text: text.into(),
        }
    }

    /// Set the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of characters in the extracted text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the document carries no readable text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Anything that turns a URL into a [`Document`].
///
/// The fetcher is the production implementation; tests plug in canned pages.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Retrieve the page at `url` and extract its readable text
    async fn fetch(&self, url: &str) -> Result<Document>;
}

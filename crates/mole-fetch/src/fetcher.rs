//! The fetcher: URL → robots check → render → extract → Document

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use mole_core::{Document, DocumentSource, Error, ExclusionPolicy, PageRenderer, Result};

use crate::config::FetchConfig;
use crate::extract::extract_text;
use crate::renderer::{http_client, HttpRenderer};
use crate::robots::RobotsPolicy;

/// Retrieves one page and turns it into a [`Document`]
pub struct Fetcher<P: ExclusionPolicy, R: PageRenderer> {
    policy: Arc<P>,
    renderer: Arc<R>,
    config: FetchConfig,
}

impl Fetcher<RobotsPolicy, HttpRenderer> {
    /// Robots-aware HTTP fetcher
    pub fn from_config(config: FetchConfig) -> Result<Self> {
        let client = http_client(&config)?;
        let policy = RobotsPolicy::new(client.clone(), config.agent_token());
        let renderer = HttpRenderer::new(client);
        Ok(Self::new(Arc::new(policy), Arc::new(renderer), config))
    }
}

impl<P: ExclusionPolicy, R: PageRenderer> Fetcher<P, R> {
    pub fn new(policy: Arc<P>, renderer: Arc<R>, config: FetchConfig) -> Self {
        Self {
            policy,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `url` and extract its readable text
    pub async fn fetch_url(&self, url: &str) -> Result<Document> {
        let parsed = parse_url(url)?;

        if !self.policy.is_allowed(&parsed).await? {
            return Err(Error::PolicyDenied {
                url: parsed.to_string(),
            });
        }

        info!("Scraping page: {}", parsed);
        let page = self.renderer.render(&parsed).await?;
        if !page.is_success() {
            return Err(Error::Fetch(format!(
                "{} returned HTTP status {}",
                parsed, page.status
            )));
        }

        let extracted = extract_text(&page.html);
        let chars = extracted.text.chars().count();
        if chars < self.config.min_text_chars.max(1) {
            warn!("No readable text found at {} ({} chars)", parsed, chars);
            return Err(Error::EmptyContent {
                url: parsed.to_string(),
            });
        }

        info!("Extracted {} characters from {}", chars, page.final_url);
        let mut document = Document::new(page.final_url, extracted.text);
        document.title = extracted.title;
        Ok(document)
    }
}

#[async_trait]
impl<P: ExclusionPolicy + 'static, R: PageRenderer + 'static> DocumentSource for Fetcher<P, R> {
    async fn fetch(&self, url: &str) -> Result<Document> {
        self.fetch_url(url).await
    }
}

/// Parse and check an absolute http(s) URL
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| Error::InvalidInput(format!("'{}' is not a valid URL: {}", url.trim(), e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported URL scheme '{}', expected http or https",
                other
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidInput(format!("'{}' has no host", url.trim())));
    }

    Ok(parsed)
}

//! HTTP page renderer

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use mole_core::{Error, PageRenderer, RenderedPage, Result};

use crate::config::FetchConfig;

/// Build the HTTP client shared by the robots policy and the renderer
pub fn http_client(config: &FetchConfig) -> Result<Client> {
    config.validate()?;
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Renderer that returns the served HTML without executing scripts
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage> {
        debug!("Requesting {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Fetch(format!("Timed out loading {}", url))
            } else {
                Error::Fetch(format!("Failed to load {}: {}", url, e))
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(RenderedPage {
            final_url,
            status,
            html,
        })
    }
}

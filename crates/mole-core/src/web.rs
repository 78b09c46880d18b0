//! Traits for the network side of the fetcher

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;

/// Site exclusion policy, usually backed by robots.txt
#[async_trait]
pub trait ExclusionPolicy: Send + Sync {
    /// Whether automated fetchers may retrieve `url`
    async fn is_allowed(&self, url: &Url) -> Result<bool>;
}

/// A page as returned by a renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Page markup
    pub html: String,
}

impl RenderedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves the markup of a page.
///
/// Implementations may execute client-side scripts before returning the
/// markup; the bundled HTTP renderer returns the served HTML as is.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &Url) -> Result<RenderedPage>;
}

/// Always-allow policy, for sources the user controls
pub struct AllowAll;

#[async_trait]
impl ExclusionPolicy for AllowAll {
    async fn is_allowed(&self, _url: &Url) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_success_range() {
        let page = |status| RenderedPage {
            final_url: "https://example.com".to_string(),
            status,
            html: String::new(),
        };
        assert!(page(200).is_success());
        assert!(page(204).is_success());
        assert!(!page(301).is_success());
        assert!(!page(404).is_success());
    }

    #[tokio::test]
    async fn test_allow_all() {
        let url = Url::parse("https://example.com/admin").unwrap();
        assert!(AllowAll.is_allowed(&url).await.unwrap());
    }
}

//! Page fetching for mole
//!
//! Validates the URL, honours the site's robots.txt, retrieves the page and
//! extracts its visible text into a [`mole_core::Document`].

mod config;
mod extract;
mod fetcher;
mod renderer;
mod robots;

#[cfg(test)]
mod test_server;

pub use config::FetchConfig;
pub use extract::{extract_text, ExtractedPage};
pub use fetcher::{parse_url, Fetcher};
pub use renderer::{http_client, HttpRenderer};
pub use robots::{robots_path, RobotsPolicy, RobotsTxt};

// Re-export core types for convenience
pub use mole_core::{Document, DocumentSource, Error, ExclusionPolicy, PageRenderer, Result};

//! Error types for mole

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scrape, index and answer pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Access to {url} is disallowed by the site's robots.txt")]
    PolicyDenied { url: String },

    #[error("No readable text found at {url}")]
    EmptyContent { url: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Nothing has been indexed yet. Scrape a page first.")]
    EmptyIndex,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the user can retry the action that failed.
    ///
    /// Configuration problems need a restart with different settings; every
    /// other failure is scoped to the scrape or question that raised it.
    pub fn is_user_recoverable(&self) -> bool {
        !matches!(self, Error::Configuration(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_denied_message_names_url() {
        let err = Error::PolicyDenied {
            url: "https://example.com/private".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Access to https://example.com/private is disallowed by the site's robots.txt"
        );
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(Error::EmptyIndex.is_user_recoverable());
        assert!(Error::Fetch("timeout".into()).is_user_recoverable());
        assert!(Error::Generation("rate limited".into()).is_user_recoverable());
        assert!(!Error::Configuration("missing key".into()).is_user_recoverable());
    }

    #[test]
    fn test_serde_json_error_maps_to_serialization() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}

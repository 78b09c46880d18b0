//! JSON export of a session's questions and answers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use mole_core::{Exchange, Result};
use mole_rag::Session;

/// Everything needed to read a session back later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub model_id: Option<String>,
    pub exported_at: DateTime<Utc>,
    pub exchanges: Vec<Exchange>,
}

impl Transcript {
    pub fn from_session(session: &Session) -> Self {
        let index = session.index();
        let document = index.and_then(|index| index.document());
        Self {
            session: session.id().to_string(),
            url: document.map(|d| d.url.clone()),
            title: document.and_then(|d| d.title.clone()),
            model_id: index.map(|index| index.model_id().to_string()),
            exported_at: Utc::now(),
            exchanges: session.history().to_vec(),
        }
    }

    /// Write the transcript as pretty-printed JSON, creating parent
    /// directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved {} exchanges to {}", self.exchanges.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn transcript() -> Transcript {
        Transcript {
            session: "3f1c".to_string(),
            url: Some("https://example.com/paris".to_string()),
            title: Some("Paris".to_string()),
            model_id: Some("hash-384-en".to_string()),
            exported_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            exchanges: vec![Exchange {
                question: "What is Paris known for?".to_string(),
                answer: "The Eiffel Tower.".to_string(),
                sources: vec![1, 0],
                asked_at: Utc.with_ymd_and_hms(2024, 5, 1, 11, 59, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("session.json");

        transcript().save(&path).unwrap();
        let loaded = Transcript::load(&path).unwrap();

        assert_eq!(loaded.session, "3f1c");
        assert_eq!(loaded.title.as_deref(), Some("Paris"));
        assert_eq!(loaded.exchanges.len(), 1);
        assert_eq!(loaded.exchanges[0].sources, vec![1, 0]);
        assert_eq!(loaded.exported_at, transcript().exported_at);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Transcript::load(&path),
            Err(mole_core::Error::Serialization(_))
        ));
        assert!(matches!(
            Transcript::load(&dir.path().join("missing.json")),
            Err(mole_core::Error::Io(_))
        ));
    }
}

//! Embedding capability and the language switch that selects its model

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Language of the scraped site, which selects the embedding model variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Turkish,
}

impl Language {
    /// Short code used in model ids
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
        }
    }

    /// Get the display name for this language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Turkish => "Turkish",
        }
    }

    /// Get all supported languages
    pub fn all() -> Vec<Language> {
        vec![Language::English, Language::Turkish]
    }

    /// Parse from a name or code
    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "turkish" | "tr" | "türkçe" => Some(Language::Turkish),
            _ => None,
        }
    }

    /// Lowercase `text` following the language's casing rules
    pub fn lowercase(&self, text: &str) -> String {
        match self {
            Language::English => text.to_lowercase(),
            Language::Turkish => text
                .chars()
                .flat_map(|c| match c {
                    'I' => vec!['ı'],
                    'İ' => vec!['i'],
                    other => other.to_lowercase().collect(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Trait for embedding providers
///
/// The same model must embed the chunks of an index and the questions asked
/// against it, so every call carries the language the index was built for.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the model used for `language`
    fn model_id(&self, language: Language) -> String;

    /// Embed several texts in one call, in input order
    async fn embed_batch(&self, texts: &[&str], language: Language) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str, language: Language) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text], language).await?;
        match (vectors.pop(), vectors.is_empty()) {
            (Some(vector), true) => Ok(vector),
            _ => Err(Error::Embedding(
                "embedder did not return exactly one vector".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("english"), Some(Language::English));
        assert_eq!(Language::parse("EN"), Some(Language::English));
        assert_eq!(Language::parse(" turkish "), Some(Language::Turkish));
        assert_eq!(Language::parse("tr"), Some(Language::Turkish));
        assert_eq!(Language::parse("klingon"), None);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Turkish.code(), "tr");
        assert_eq!(Language::all().len(), 2);
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_turkish_lowercase_handles_dotted_i() {
        assert_eq!(Language::Turkish.lowercase("İSTANBUL"), "istanbul");
        assert_eq!(Language::Turkish.lowercase("IRMAK"), "ırmak");
        assert_eq!(Language::English.lowercase("IRMAK"), "irmak");
    }

    struct FixedEmbedder(Vec<Vec<f32>>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn model_id(&self, language: Language) -> String {
            format!("fixed-{}", language.code())
        }

        async fn embed_batch(&self, _texts: &[&str], _language: Language) -> Result<Vec<Vec<f32>>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_embed_requires_exactly_one_vector() {
        let one = FixedEmbedder(vec![vec![1.0, 0.0]]);
        assert_eq!(one.embed("x", Language::English).await.unwrap(), vec![1.0, 0.0]);

        let two = FixedEmbedder(vec![vec![1.0], vec![2.0]]);
        assert!(matches!(
            two.embed("x", Language::English).await,
            Err(Error::Embedding(_))
        ));

        let none = FixedEmbedder(Vec::new());
        assert!(matches!(
            none.embed("x", Language::English).await,
            Err(Error::Embedding(_))
        ));
    }
}

//! Session construction from command-line options

use clap::ValueEnum;
use std::sync::Arc;
use tracing::info;

use mole_core::{
    ChunkingConfig, DocumentSource, Embedder, Language, Result, RetrievalConfig, TextGenerator,
};
use mole_fetch::{FetchConfig, Fetcher};
use mole_llm::{build_generator, EmbeddingConfig, LlmConfig, OpenAiEmbedder, ProviderKind};
use mole_rag::{Answerer, HashEmbedder, Indexer, Session};

/// Where chunk and question vectors come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Feature hashing on this machine, no API key needed
    #[default]
    Local,
    /// OpenAI-compatible embeddings endpoint
    Remote,
}

/// What a one-shot run does after scraping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Task {
    #[default]
    Chat,
    Summary,
    KeyPoints,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub language: Language,
    /// Overrides `MOLE_PROVIDER`
    pub provider: Option<ProviderKind>,
    /// Overrides `MOLE_MODEL` and the provider default
    pub model: Option<String>,
    pub embedder: EmbedderKind,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub temperature: f32,
    pub max_tokens: u32,
    pub user_agent: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            provider: None,
            model: None,
            embedder: EmbedderKind::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            temperature: 0.7,
            max_tokens: 1000,
            user_agent: None,
        }
    }
}

/// Build a session that fetches real pages and talks to the configured
/// provider
pub fn build_session(options: &SessionOptions) -> Result<Session> {
    let fetch_config = match &options.user_agent {
        Some(user_agent) => FetchConfig::new(user_agent.clone()),
        None => FetchConfig::default(),
    };
    let source: Arc<dyn DocumentSource> = Arc::new(Fetcher::from_config(fetch_config)?);

    let mut llm_config = LlmConfig::from_env(options.provider)?;
    if let Some(model) = &options.model {
        llm_config = llm_config.with_model(model.clone());
    }
    let llm_config = llm_config.with_sampling(options.temperature, options.max_tokens);
    info!("Using {} model {}", llm_config.provider, llm_config.model);
    let generator = build_generator(llm_config)?;

    build_session_with(options, source, generator)
}

/// Build a session around an existing source and generator
pub fn build_session_with(
    options: &SessionOptions,
    source: Arc<dyn DocumentSource>,
    generator: Arc<dyn TextGenerator>,
) -> Result<Session> {
    let embedder = build_embedder(options.embedder)?;
    let indexer = Indexer::new(embedder, options.chunking.clone(), options.language)?
        .with_tie_break(options.retrieval.tie_break);
    let answerer = Answerer::new(Arc::new(indexer), generator, options.retrieval.clone())?
        .with_sampling(options.temperature, options.max_tokens);

    Ok(Session::new(source, answerer))
}

fn build_embedder(kind: EmbedderKind) -> Result<Arc<dyn Embedder>> {
    Ok(match kind {
        EmbedderKind::Local => Arc::new(HashEmbedder::new()),
        EmbedderKind::Remote => Arc::new(OpenAiEmbedder::new(EmbeddingConfig::from_env()?)?),
    })
}

/// `clap` value parser for `--language`
pub fn parse_language(value: &str) -> std::result::Result<Language, String> {
    Language::parse(value).ok_or_else(|| format!("unknown language '{}', expected english or turkish", value))
}

/// `clap` value parser for `--provider`
pub fn parse_provider(value: &str) -> std::result::Result<ProviderKind, String> {
    ProviderKind::parse(value).ok_or_else(|| {
        let names: Vec<&str> = ProviderKind::all().iter().map(|p| p.name()).collect();
        format!("unknown provider '{}', expected one of: {}", value, names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mole_core::{Document, Error, GenerationRequest, GenerationResult};

    struct StaticSource;

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn fetch(&self, url: &str) -> Result<Document> {
            Ok(Document::new(url, "İstanbul boğazı iki kıtayı ayırır. Şehir çok kalabalıktır."))
        }
    }

    struct SilentGenerator;

    #[async_trait]
    impl TextGenerator for SilentGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult> {
            Ok(GenerationResult {
                text: String::new(),
                model_id: "silent".to_string(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn test_session_uses_selected_language() {
        let options = SessionOptions {
            language: Language::Turkish,
            chunking: ChunkingConfig::new(200, 20),
            ..Default::default()
        };
        let mut session =
            build_session_with(&options, Arc::new(StaticSource), Arc::new(SilentGenerator)).unwrap();

        let report = session.scrape("https://example.com/istanbul").await.unwrap();
        assert_eq!(report.model_id, "hash-384-tr");
        assert_eq!(report.chunks, 1);
    }

    #[test]
    fn test_invalid_knobs_are_configuration_errors() {
        let bad_chunking = SessionOptions {
            chunking: ChunkingConfig::new(100, 100),
            ..Default::default()
        };
        let bad_context = SessionOptions {
            retrieval: RetrievalConfig {
                max_context_chars: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        for options in [bad_chunking, bad_context] {
            let result = build_session_with(&options, Arc::new(StaticSource), Arc::new(SilentGenerator));
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_language("TR"), Ok(Language::Turkish));
        assert_eq!(parse_provider("claude"), Ok(ProviderKind::Anthropic));

        let err = parse_provider("bedrock").unwrap_err();
        assert_eq!(
            err,
            "unknown provider 'bedrock', expected one of: openai, groq, anthropic, huggingface"
        );
        assert!(parse_language("french").is_err());
    }
}

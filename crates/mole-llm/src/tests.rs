//! Tests for provider configuration and wire formats

#[cfg(test)]
mod snapshot_tests {
    use crate::client::{parse_anthropic_response, parse_chat_response, status_error};
    use crate::embeddings::parse_embeddings;
    use crate::{
        build_generator, AnthropicClient, Embedder, EmbeddingConfig, Error, GenerationRequest,
        LlmConfig, OpenAiCompatibleClient, OpenAiEmbedder, ProviderKind,
    };
    use insta::assert_yaml_snapshot;
    use mole_core::Language;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_snapshot() {
        let config = LlmConfig::new(ProviderKind::OpenAi, "sk-test").with_sampling(0.5, 512);

        assert_yaml_snapshot!(config, { ".api_key" => "[redacted]" }, @r#"
        provider: openai
        model: gpt-4o-mini
        api_key: "[redacted]"
        base_url: "https://api.openai.com/v1"
        temperature: 0.5
        max_tokens: 512
        timeout_secs: 60
        "#);
    }

    #[test]
    fn test_provider_defaults() {
        let models: Vec<(&str, &str)> = ProviderKind::all()
            .iter()
            .map(|p| (p.name(), p.default_model()))
            .collect();
        assert_eq!(models, vec![
            ("openai", "gpt-4o-mini"),
            ("groq", "llama3-8b-8192"),
            ("anthropic", "claude-3-haiku-20240307"),
            ("huggingface", "mistralai/Mistral-7B-Instruct-v0.3"),
        ]);
        assert_eq!(ProviderKind::parse("Claude"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::parse("hf"), Some(ProviderKind::HuggingFace));
        assert_eq!(ProviderKind::parse("watsonx"), None);
    }

    #[test]
    fn test_config_from_vars() {
        let config = LlmConfig::from_vars(
            None,
            vars(&[
                ("MOLE_PROVIDER", "groq"),
                ("GROQ_API_KEY", " gsk-test "),
                ("MOLE_MODEL", "llama-3.1-8b-instant"),
                ("MOLE_BASE_URL", ""),
            ]),
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Groq);
        assert_eq!(config.api_key, "gsk-test");
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_explicit_provider_overrides_environment() {
        let config = LlmConfig::from_vars(
            Some(ProviderKind::Anthropic),
            vars(&[("MOLE_PROVIDER", "groq"), ("ANTHROPIC_API_KEY", "key")]),
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Anthropic);
        assert_eq!(config.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_config_errors() {
        let missing = LlmConfig::from_vars(None, vars(&[])).unwrap_err();
        assert!(matches!(missing, Error::Configuration(ref msg) if msg.contains("OPENAI_API_KEY")));

        let unknown = LlmConfig::from_vars(None, vars(&[("MOLE_PROVIDER", "nope")])).unwrap_err();
        assert!(matches!(unknown, Error::Configuration(ref msg) if msg.contains("nope")));

        let hot = LlmConfig::new(ProviderKind::OpenAi, "key").with_sampling(3.0, 10);
        assert!(hot.validate().is_err());
        assert!(OpenAiCompatibleClient::new(LlmConfig::new(ProviderKind::OpenAi, " ")).is_err());
    }

    #[test]
    fn test_embedding_config() {
        let config = EmbeddingConfig::from_vars(vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MOLE_EMBEDDING_MODEL_TR", "custom-tr"),
        ]))
        .unwrap();
        assert_eq!(config.model_for(Language::English), "text-embedding-ada-002");
        assert_eq!(config.model_for(Language::Turkish), "custom-tr");

        assert!(matches!(
            EmbeddingConfig::from_vars(vars(&[])),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_embedder_model_follows_language() {
        let embedder = OpenAiEmbedder::new(EmbeddingConfig::new("sk-test")).unwrap();
        assert_eq!(embedder.model_id(Language::English), "text-embedding-ada-002");
        assert_eq!(embedder.model_id(Language::Turkish), "text-embedding-3-large");
    }

    #[test]
    fn test_chat_request_body() {
        let client = OpenAiCompatibleClient::new(LlmConfig::new(ProviderKind::OpenAi, "sk-test")).unwrap();
        let request = GenerationRequest::new("Question: why?")
            .with_system("Be brief.")
            .with_sampling(0.25, 200);

        let body = serde_json::to_value(client.body(&request)).unwrap();
        assert_eq!(body, json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Question: why?"}
            ],
            "temperature": 0.25,
            "max_tokens": 200
        }));
    }

    #[test]
    fn test_anthropic_request_body() {
        let client = AnthropicClient::new(LlmConfig::new(ProviderKind::Anthropic, "key")).unwrap();
        let body = serde_json::to_value(client.body(&GenerationRequest::new("hi"))).unwrap();
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("system").is_none());
        assert_eq!(body["messages"][0], json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "The Eiffel Tower."}}],
            "usage": {"prompt_tokens": 50, "completion_tokens": 5, "total_tokens": 55}
        }"#;
        let result = parse_chat_response(body, "gpt-4o-mini").unwrap();
        assert_eq!(result.text, "The Eiffel Tower.");
        assert_eq!(result.model_id, "gpt-4o-mini-2024-07-18");
        assert_eq!(result.tokens_used, Some(55));

        let empty = parse_chat_response(r#"{"choices": [{"message": {"content": null}}]}"#, "m").unwrap();
        assert_eq!(empty.text, "");
        assert_eq!(empty.model_id, "m");

        assert!(matches!(
            parse_chat_response(r#"{"choices": []}"#, "m"),
            Err(Error::Generation(_))
        ));
        assert!(matches!(parse_chat_response("<html>", "m"), Err(Error::Generation(_))));
    }

    #[test]
    fn test_parse_anthropic_response() {
        let body = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [
                {"type": "text", "text": "First."},
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "Second."}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }"#;
        let result = parse_anthropic_response(body, "claude").unwrap();
        assert_eq!(result.text, "First.\nSecond.");
        assert_eq!(result.tokens_used, Some(14));
    }

    #[test]
    fn test_status_errors() {
        assert!(matches!(
            status_error(ProviderKind::Groq, StatusCode::TOO_MANY_REQUESTS, ""),
            Error::Generation(ref msg) if msg.contains("rate limit")
        ));
        assert!(matches!(
            status_error(ProviderKind::OpenAi, StatusCode::UNAUTHORIZED, "bad key"),
            Error::Configuration(_)
        ));
        assert!(matches!(
            status_error(ProviderKind::OpenAi, StatusCode::BAD_GATEWAY, "upstream\n"),
            Error::Generation(ref msg) if msg.ends_with("upstream")
        ));
    }

    #[test]
    fn test_parse_embeddings_restores_input_order() {
        let body = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        assert_eq!(parse_embeddings(body, 2).unwrap(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(parse_embeddings(body, 3), Err(Error::Embedding(_))));
    }

    #[test]
    fn test_parse_embeddings_rejects_bad_indices() {
        let duplicate = r#"{"data": [
            {"index": 0, "embedding": [1.0]},
            {"index": 0, "embedding": [2.0]}
        ]}"#;
        let out_of_range = r#"{"data": [
            {"index": 0, "embedding": [1.0]},
            {"index": 5, "embedding": [2.0]}
        ]}"#;

        for body in [duplicate, out_of_range] {
            assert!(matches!(
                parse_embeddings(body, 2),
                Err(Error::Embedding(ref msg)) if msg.contains("expected")
            ));
        }
    }

    #[test]
    fn test_build_generator_per_provider() {
        for provider in ProviderKind::all() {
            let generator = build_generator(LlmConfig::new(provider, "key")).unwrap();
            assert_eq!(generator.model_id(), provider.default_model());
        }
    }
}

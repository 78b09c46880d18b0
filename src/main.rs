use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use mole_cli::{
    build_session, init_logging, parse_language, parse_provider, render_markdown, run_once, ui,
    Command, EmbedderKind, Repl, SessionOptions, Task,
};
use mole_core::{ChunkingConfig, Language, RetrievalConfig};
use mole_llm::ProviderKind;

#[derive(Parser)]
#[command(name = "mole", version)]
#[command(about = "Scrape a web page and ask questions about it", long_about = None)]
struct Cli {
    /// Page to scrape before answering or entering the prompt
    #[arg(short, long, env = "MOLE_URL")]
    url: Option<String>,

    /// Answer one question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Run one task and exit
    #[arg(short, long, value_enum)]
    task: Option<Task>,

    /// Language of the page, selects the embedding model
    #[arg(short, long, env = "MOLE_LANGUAGE", default_value = "english", value_parser = parse_language)]
    language: Language,

    /// Text generation provider (openai, groq, anthropic, huggingface)
    #[arg(short, long, env = "MOLE_PROVIDER", value_parser = parse_provider)]
    provider: Option<ProviderKind>,

    /// Model name, defaults to the provider's default
    #[arg(short, long, env = "MOLE_MODEL")]
    model: Option<String>,

    #[arg(long, value_enum, env = "MOLE_EMBEDDER", default_value_t = EmbedderKind::Local)]
    embedder: EmbedderKind,

    /// Maximum characters per chunk
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared by neighbouring chunks
    #[arg(long, default_value_t = 200)]
    overlap: usize,

    /// Chunks retrieved per question
    #[arg(short = 'k', long, default_value_t = 5)]
    top_k: usize,

    #[arg(long, default_value_t = 4000)]
    max_context_chars: usize,

    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    #[arg(long, default_value_t = 1000)]
    max_tokens: u32,

    /// User agent sent to sites and matched against robots.txt
    #[arg(long, env = "MOLE_USER_AGENT")]
    user_agent: Option<String>,

    /// Debug logging for mole crates (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            language: self.language,
            provider: self.provider,
            model: self.model.clone(),
            embedder: self.embedder,
            chunking: ChunkingConfig::new(self.chunk_size, self.overlap),
            retrieval: RetrievalConfig {
                top_k: self.top_k,
                max_context_chars: self.max_context_chars,
                ..Default::default()
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            user_agent: self.user_agent.clone(),
        }
    }

    fn is_one_shot(&self) -> bool {
        self.question.is_some() || self.task.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut session = build_session(&cli.session_options()).context("failed to start mole")?;
    debug!("Session {} ready", session.id());

    // One-shot mode
    if cli.is_one_shot() {
        let Some(url) = cli.url.as_deref() else {
            bail!("--url is required with --question or --task");
        };
        let task = cli.task.unwrap_or_default();
        let text = run_once(&mut session, url, task, cli.question.as_deref()).await?;
        println!("{}", render_markdown(&text));
        return Ok(());
    }

    // Interactive mode
    let mut repl = Repl::new(session);
    if let Some(url) = cli.url {
        let command = Command::Scrape(url);
        ui::print_progress(&command);
        match repl.execute(command).await {
            Ok(reply) => ui::print_reply(&reply),
            Err(e) => ui::print_error(&e),
        }
    }

    repl.run().await?;
    Ok(())
}

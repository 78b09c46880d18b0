//! Terminal front end for mole
//!
//! Command parsing, the interactive loop, markdown rendering for model
//! output, logging setup and transcript export.

pub mod commands;
pub mod logging;
pub mod markdown;
pub mod options;
pub mod repl;
pub mod transcript;
pub mod ui;

pub use commands::Command;
pub use logging::init_logging;
pub use markdown::render_markdown;
pub use options::{
    build_session, build_session_with, parse_language, parse_provider, EmbedderKind,
    SessionOptions, Task,
};
pub use repl::{run_once, Repl, Reply};
pub use transcript::Transcript;

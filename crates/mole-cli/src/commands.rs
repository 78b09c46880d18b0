//! Interactive command parsing

use std::path::PathBuf;

use mole_core::{Error, Result};

/// One line of interactive input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scrape(String),
    Ask(String),
    Summary,
    KeyPoints,
    Sources,
    Stats,
    History,
    Save(PathBuf),
    Reset,
    Help,
    Exit,
}

impl Command {
    /// Parse a line of input. Anything that is not a known command is a
    /// question.
    pub fn parse(input: &str) -> Result<Command> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput("empty command".to_string()));
        }

        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "scrape" | "open" => Command::Scrape(required(rest, "scrape <url>")?),
            "ask" => Command::Ask(required(rest, "ask <question>")?),
            "save" => Command::Save(PathBuf::from(required(rest, "save <path>")?)),
            "summary" | "summarize" if rest.is_empty() => Command::Summary,
            "keypoints" | "key-points" if rest.is_empty() => Command::KeyPoints,
            "sources" if rest.is_empty() => Command::Sources,
            "stats" if rest.is_empty() => Command::Stats,
            "history" if rest.is_empty() => Command::History,
            "reset" | "refresh" if rest.is_empty() => Command::Reset,
            "help" | "?" if rest.is_empty() => Command::Help,
            "exit" | "quit" if rest.is_empty() => Command::Exit,
            _ if rest.is_empty() && looks_like_url(word) => Command::Scrape(word.to_string()),
            _ => Command::Ask(input.to_string()),
        };
        Ok(command)
    }
}

fn required(value: &str, usage: &str) -> Result<String> {
    if value.is_empty() {
        Err(Error::InvalidInput(format!("usage: {}", usage)))
    } else {
        Ok(value.to_string())
    }
}

fn looks_like_url(word: &str) -> bool {
    let lower = word.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

//! The interactive loop and one-shot runs

use tracing::debug;

use mole_core::{Error, Result};
use mole_rag::Session;

use crate::commands::Command;
use crate::options::Task;
use crate::transcript::Transcript;
use crate::ui;

pub const NO_ANSWER: &str = "I'm sorry, I don't answer this question.";
pub const NO_SUMMARY: &str = "I'm sorry, I couldn't generate a summary for this document.";
pub const NO_KEY_POINTS: &str = "I'm sorry, I couldn't extract key points from this document.";

const PREVIEW_CHARS: usize = 160;

/// What the terminal should show after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A short confirmation
    Status(String),
    /// Model output, rendered before printing
    Markdown(String),
    Plain(String),
    Help,
    Exit,
}

/// Interactive front end over one session
pub struct Repl {
    session: Session,
    input_history: Vec<String>,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            input_history: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parse and run one line of input
    pub async fn handle_line(&mut self, line: &str) -> Result<Reply> {
        let command = Command::parse(line)?;
        self.execute(command).await
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!("Executing {:?}", command);
        match command {
            Command::Scrape(url) => {
                let report = self.session.scrape(&url).await?;
                let name = report.title.as_deref().unwrap_or(&report.url);
                Ok(Reply::Status(format!(
                    "Indexed {} ({} chunks, {} characters). Ask away!",
                    name, report.chunks, report.characters
                )))
            }
            Command::Ask(question) => {
                let answer = self.session.ask(&question).await?;
                Ok(model_output(answer.text, NO_ANSWER))
            }
            Command::Summary => Ok(model_output(self.session.summarize().await?, NO_SUMMARY)),
            Command::KeyPoints => Ok(model_output(self.session.key_points().await?, NO_KEY_POINTS)),
            Command::Sources => Ok(Reply::Plain(self.sources())),
            Command::Stats => Ok(Reply::Plain(serde_json::to_string_pretty(&self.session.stats())?)),
            Command::History => Ok(Reply::Plain(self.history())),
            Command::Save(path) => {
                let transcript = Transcript::from_session(&self.session);
                transcript.save(&path)?;
                Ok(Reply::Status(format!(
                    "Saved {} exchanges to {}",
                    transcript.exchanges.len(),
                    path.display()
                )))
            }
            Command::Reset => {
                self.session.reset();
                Ok(Reply::Status("Session reset. Scrape a page to start again.".to_string()))
            }
            Command::Help => Ok(Reply::Help),
            Command::Exit => Ok(Reply::Exit),
        }
    }

    /// Read commands until `exit` or end of input. Errors are reported and
    /// the loop carries on.
    pub async fn run(&mut self) -> Result<()> {
        ui::display_banner();

        while let Some(line) = ui::read_line(&mut self.input_history)? {
            if line.trim().is_empty() {
                continue;
            }
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    ui::print_error(&e);
                    continue;
                }
            };

            ui::print_progress(&command);
            match self.execute(command).await {
                Ok(Reply::Exit) => break,
                Ok(reply) => ui::print_reply(&reply),
                Err(e) => ui::print_error(&e),
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    fn sources(&self) -> String {
        let Some(answer) = self.session.last_answer() else {
            return "No question has been answered yet.".to_string();
        };
        if answer.context.is_empty() {
            return "The last answer used no context.".to_string();
        }

        answer
            .context
            .iter()
            .enumerate()
            .map(|(rank, chunk)| {
                format!("[{}] chunk {}: {}", rank + 1, chunk.ordinal, preview(&chunk.text))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn history(&self) -> String {
        let history = self.session.history();
        if history.is_empty() {
            return "No questions asked yet.".to_string();
        }

        history
            .iter()
            .enumerate()
            .map(|(i, exchange)| {
                format!(
                    "{}. {} ({})\n   {}",
                    i + 1,
                    exchange.question,
                    exchange.asked_at.format("%H:%M:%S"),
                    preview(&exchange.answer)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scrape `url` and run a single task, returning the text to print
pub async fn run_once(
    session: &mut Session,
    url: &str,
    task: Task,
    question: Option<&str>,
) -> Result<String> {
    if task == Task::Chat && question.is_none() {
        return Err(Error::InvalidInput("--question is required for the chat task".to_string()));
    }

    session.scrape(url).await?;
    let text = match (task, question) {
        (Task::Summary, _) => or_apology(session.summarize().await?, NO_SUMMARY),
        (Task::KeyPoints, _) => or_apology(session.key_points().await?, NO_KEY_POINTS),
        (Task::Chat, question) => {
            let answer = session.ask(question.unwrap_or_default()).await?;
            or_apology(answer.text, NO_ANSWER)
        }
    };
    Ok(text)
}

fn model_output(text: String, apology: &str) -> Reply {
    if text.trim().is_empty() {
        Reply::Plain(apology.to_string())
    } else {
        Reply::Markdown(text)
    }
}

fn or_apology(text: String, apology: &str) -> String {
    if text.trim().is_empty() {
        apology.to_string()
    } else {
        text
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let clipped: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", clipped.trim_end())
}

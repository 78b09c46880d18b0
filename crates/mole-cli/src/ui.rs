//! Terminal output and line editing

use colored::*;
use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType},
};
use std::io::{self, IsTerminal, Write};

use mole_core::{Error, Result};

use crate::commands::Command;
use crate::markdown::render_markdown;
use crate::repl::Reply;

const PROMPT: &str = "mole>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "mole - ask questions about any web page";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(inner.saturating_sub(title.chars().count() + 2)),
        "│".blue()
    );
    println!("{}", empty_line.blue());

    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let feature_lines = [
        "• Paste a URL to scrape and index it",
        "• Ask anything about the page in plain words",
        "• 'summary' and 'keypoints' cover the whole page",
        "• History navigation with ↑/↓, Esc clears the line",
        "",
        version.as_str(),
    ];

    for line in feature_lines {
        let padding = " ".repeat(inner.saturating_sub(line.chars().count() + 2));
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else if line.starts_with('v') {
            println!("{}{}{}{}", "│  ".blue(), line.dimmed(), padding, "│".blue());
        } else {
            println!("{}", format!("│  {}{}│", line, padding).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!("{}", "💡 Tip: start with 'scrape <url>', or 'help' for commands".dimmed());
    println!();
}

/// Read one line with history navigation.
///
/// Returns `None` at end of input or on Ctrl+C/Ctrl+D. Piped input is read
/// line by line without raw mode.
pub fn read_line(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    let _raw = RawMode::enable()?;
    let mut editor = LineEditor::default();
    redraw(&editor)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match editor.handle_key(key, history) {
            KeyOutcome::Submit => {
                print!("\r\n");
                io::stdout().flush()?;
                let input = editor.text();
                if !input.trim().is_empty() {
                    history.push(input.clone());
                }
                return Ok(Some(input));
            }
            KeyOutcome::Quit => {
                print!("\r\n");
                io::stdout().flush()?;
                return Ok(None);
            }
            KeyOutcome::Changed => redraw(&editor)?,
            KeyOutcome::Ignored => {}
        }
    }
}

fn redraw(editor: &LineEditor) -> Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    print!("{} {}", PROMPT.green().bold(), editor.text());
    let column = PROMPT.chars().count() + 1 + editor.cursor;
    queue!(stdout, MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)))?;
    stdout.flush()?;
    Ok(())
}

/// Leaves raw mode when dropped, including on early returns
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, PartialEq)]
enum KeyOutcome {
    Submit,
    Quit,
    Changed,
    Ignored,
}

/// Line buffer with the cursor counted in characters, so multi-byte input
/// such as Turkish letters edits correctly
#[derive(Debug, Default)]
struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
    history_index: Option<usize>,
}

impl LineEditor {
    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn set(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    fn handle_key(&mut self, key: KeyEvent, history: &[String]) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => KeyOutcome::Submit,
            KeyCode::Char('c') if ctrl => KeyOutcome::Quit,
            KeyCode::Char('d') if ctrl && self.chars.is_empty() => KeyOutcome::Quit,
            KeyCode::Char(_) if ctrl => KeyOutcome::Ignored,
            KeyCode::Char(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
                KeyOutcome::Changed
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
                KeyOutcome::Changed
            }
            KeyCode::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
                KeyOutcome::Changed
            }
            KeyCode::Left if self.cursor > 0 => {
                self.cursor -= 1;
                KeyOutcome::Changed
            }
            KeyCode::Right if self.cursor < self.chars.len() => {
                self.cursor += 1;
                KeyOutcome::Changed
            }
            KeyCode::Home => {
                self.cursor = 0;
                KeyOutcome::Changed
            }
            KeyCode::End => {
                self.cursor = self.chars.len();
                KeyOutcome::Changed
            }
            KeyCode::Up if !history.is_empty() => {
                let index = match self.history_index {
                    None => history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                self.history_index = Some(index);
                self.set(&history[index]);
                KeyOutcome::Changed
            }
            KeyCode::Down => match self.history_index {
                Some(i) if i + 1 < history.len() => {
                    self.history_index = Some(i + 1);
                    self.set(&history[i + 1]);
                    KeyOutcome::Changed
                }
                Some(_) => {
                    self.history_index = None;
                    self.set("");
                    KeyOutcome::Changed
                }
                None => KeyOutcome::Ignored,
            },
            KeyCode::Esc => {
                self.history_index = None;
                self.set("");
                KeyOutcome::Changed
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

/// Say what is happening before a slow command
pub fn print_progress(command: &Command) {
    let message = match command {
        Command::Scrape(url) => format!("Scraping {}...", url),
        Command::Ask(_) => "Thinking...".to_string(),
        Command::Summary => "Summarizing the page...".to_string(),
        Command::KeyPoints => "Extracting key points...".to_string(),
        _ => return,
    };
    println!("{} {}", "🔎".blue(), message.dimmed());
}

pub fn print_reply(reply: &Reply) {
    match reply {
        Reply::Status(message) => println!("{} {}", "✅".green(), message),
        Reply::Markdown(text) => {
            println!();
            println!("{}", render_markdown(text));
            println!();
        }
        Reply::Plain(text) => println!("{}", text),
        Reply::Help => print_help(),
        Reply::Exit => {}
    }
}

pub fn print_error(error: &Error) {
    println!("{} {}", "❌".red(), error);
    if !error.is_user_recoverable() {
        println!("{}", "   Check your API keys and settings, then restart mole.".yellow());
    }
}

pub fn print_goodbye() {
    println!("{}", "👋 Goodbye!".green());
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Scrape a page and index it (a bare URL works too)", "scrape <url>".green());
    println!("  {} - Ask about the page (or just type the question)", "ask <question>".green());
    println!("  {} - Summarize the whole page", "summary".green());
    println!("  {} - List the page's key points", "keypoints".green());
    println!("  {} - Show the passages behind the last answer", "sources".green());
    println!("  {} - Show index and session statistics", "stats".green());
    println!("  {} - List questions asked so far", "history".green());
    println!("  {} - Export the conversation as JSON", "save <path>".green());
    println!("  {} - Forget the page and the conversation", "reset".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  scrape https://en.wikipedia.org/wiki/Paris");
    println!("  What is Paris known for?");
    println!("  save paris.json");
}

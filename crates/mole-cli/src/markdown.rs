//! Markdown to plain terminal text

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Render model output written in markdown as plain text.
///
/// Emphasis markers are dropped, list items get bullets or numbers, nested
/// lists are indented and code blocks are indented by four spaces.
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::List(start)) => {
                line_break(&mut out);
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    blank_line(&mut out);
                }
            }
            Event::Start(Tag::Item) => {
                line_break(&mut out);
                out.push_str(&"  ".repeat(lists.len().saturating_sub(1)));
                match lists.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{}. ", number));
                        *number += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::End(TagEnd::Item) => line_break(&mut out),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_)) => {
                if lists.is_empty() {
                    blank_line(&mut out);
                } else {
                    line_break(&mut out);
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                line_break(&mut out);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                blank_line(&mut out);
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => {
                line_break(&mut out);
                out.push_str("────────");
                blank_line(&mut out);
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn blank_line(out: &mut String) {
    line_break(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

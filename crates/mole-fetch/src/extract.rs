//! Visible-text extraction from HTML

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose content is never shown to a reader
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "head", "iframe", "object", "canvas",
];

/// Elements that start a new line of text
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Title and readable text of a page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
}

/// Extract the title and the visible text of an HTML page.
///
/// Block elements end a line, whitespace runs collapse to one space and
/// empty lines are dropped.
pub fn extract_text(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    });

    let mut buffer = LineBuffer::default();
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    walk(body.unwrap_or_else(|| document.root_element()), &mut buffer);

    ExtractedPage {
        title,
        text: buffer.finish(),
    }
}

fn walk(element: ElementRef<'_>, buffer: &mut LineBuffer) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buffer.push(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                let is_block = BLOCKS.contains(&name);
                if is_block {
                    buffer.break_line();
                }
                walk(child, buffer);
                if is_block {
                    buffer.break_line();
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
}

impl LineBuffer {
    fn push(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = collapse_whitespace(&self.current);
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

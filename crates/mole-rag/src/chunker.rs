//! Sentence-aware text splitting

use std::ops::Range;

use mole_core::{Chunk, ChunkingConfig, Document, Result};

/// Splits document text into overlapping windows
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Cut `document` into chunks, numbered in document order
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split(&document.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, range)| Chunk {
                document_id: document.id,
                ordinal,
                text: document.text[range.clone()].to_string(),
                range,
            })
            .collect()
    }

    /// Byte ranges of the chunks of `text`.
    ///
    /// Each window holds at most `chunk_size` characters and never starts or
    /// ends with whitespace.
    pub fn split(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let n = chars.len();
        let size = self.config.chunk_size;
        let byte_at = |i: usize| if i < n { chars[i].0 } else { text.len() };

        let mut ranges = Vec::new();
        let mut start = 0;

        loop {
            while start < n && chars[start].1.is_whitespace() {
                start += 1;
            }
            if start >= n {
                break;
            }

            let limit = (start + size).min(n);
            let end = if limit == n {
                n
            } else {
                find_break(&chars, start, limit, size)
            };

            let mut trimmed = end;
            while trimmed > start && chars[trimmed - 1].1.is_whitespace() {
                trimmed -= 1;
            }
            ranges.push(byte_at(start)..byte_at(trimmed));

            if end >= n {
                break;
            }

            let mut next = end.saturating_sub(self.config.overlap);
            // Never restart in the middle of a word
            while next < end && next > 0 && !chars[next - 1].1.is_whitespace() {
                next += 1;
            }
            if next <= start {
                // Overlap reaches back past this window's start: restart at
                // its next word instead
                next = (start + 1..end)
                    .find(|&i| chars[i - 1].1.is_whitespace() && !chars[i].1.is_whitespace())
                    .unwrap_or(end);
            }
            start = next;
        }

        ranges
    }
}

/// Where to end the window `start..limit`, preferring sentence ends and then
/// whitespace in the second half of the window
fn find_break(chars: &[(usize, char)], start: usize, limit: usize, size: usize) -> usize {
    let lower = start + (size / 2).max(1);

    let sentence_end = (lower..=limit).rev().find(|&i| {
        chars[i].1.is_whitespace() && matches!(chars[i - 1].1, '.' | '!' | '?')
    });
    if let Some(end) = sentence_end {
        return end;
    }

    (lower..=limit)
        .rev()
        .find(|&i| chars[i].1.is_whitespace())
        .unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: &str = "Paris is the capital of France. It is known for the Eiffel Tower.";

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkingConfig::new(size, overlap)).unwrap()
    }

    fn pieces<'a>(text: &'a str, chunker: &TextChunker) -> Vec<&'a str> {
        chunker.split(text).into_iter().map(|r| &text[r]).collect()
    }

    #[test]
    fn test_one_chunk_per_sentence() {
        let chunker = chunker(40, 0);
        assert_eq!(
            pieces(PARIS, &chunker),
            vec!["Paris is the capital of France.", "It is known for the Eiffel Tower."]
        );
        assert_eq!(chunker.split(PARIS), vec![0..31, 32..65]);
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(pieces(PARIS, &chunker(1000, 200)), vec![PARIS]);
        assert_eq!(pieces("  padded  ", &chunker(1000, 200)), vec!["padded"]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunker(10, 2).split("").is_empty());
        assert!(chunker(10, 2).split(" \n\t  ").is_empty());
    }

    #[test]
    fn test_falls_back_to_whitespace_then_hard_cut() {
        let chunker = chunker(10, 0);
        assert_eq!(
            pieces("alpha beta gamma delta", &chunker),
            vec!["alpha beta", "gamma", "delta"]
        );
        assert_eq!(pieces("abcdefghijklmnopqrstuvwxyz", &chunker), vec![
            "abcdefghij",
            "klmnopqrst",
            "uvwxyz"
        ]);
    }

    #[test]
    fn test_overlap_restarts_at_a_word() {
        let chunker = chunker(20, 8);
        let text = "one two three four five six seven eight";
        let chunks = pieces(text, &chunker);
        assert_eq!(chunks, vec![
            "one two three four",
            "four five six seven",
            "seven eight"
        ]);
    }

    #[test]
    fn test_large_overlap_still_shares_words() {
        let chunker = chunker(10, 8);
        assert_eq!(pieces("aa bb cc dd ee ff", &chunker), vec![
            "aa bb cc",
            "bb cc dd",
            "cc dd ee",
            "dd ee ff"
        ]);
    }

    #[test]
    fn test_chunks_respect_size_and_cover_text() {
        let text = "Lorem ipsum dolor sit amet. ".repeat(40);
        let chunker = chunker(100, 20);
        let ranges = chunker.split(&text);
        assert!(ranges.len() > 1);
        for range in &ranges {
            let piece = &text[range.clone()];
            assert!(piece.chars().count() <= 100);
            assert_eq!(piece, piece.trim());
        }
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, text.trim_end().len());
    }

    #[test]
    fn test_multibyte_text_uses_byte_ranges() {
        let text = "Çalışkan öğrenci İstanbul'da yaşıyor. Ödevlerini düzenli yapıyor.";
        let chunker = chunker(40, 0);
        let ranges = chunker.split(text);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&text[ranges[0].clone()], "Çalışkan öğrenci İstanbul'da yaşıyor.");
        assert_eq!(&text[ranges[1].clone()], "Ödevlerini düzenli yapıyor.");
    }

    #[test]
    fn test_chunk_document_numbers_chunks() {
        let document = Document::new("https://example.com/paris", PARIS);
        let chunks = chunker(40, 0).chunk(&document);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[1].ordinal, 1);
        assert!(chunks.iter().all(|c| c.document_id == document.id));
        assert_eq!(chunks[1].text, "It is known for the Eiffel Tower.");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(TextChunker::new(ChunkingConfig::new(10, 10)).is_err());
        assert!(TextChunker::new(ChunkingConfig::new(0, 0)).is_err());
    }
}

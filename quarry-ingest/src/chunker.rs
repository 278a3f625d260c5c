//! Paragraph chunking for extracted page text
//!
//! Pages split into paragraphs on blank lines. Offsets are character
//! positions in a normalized rendering of the page where consecutive
//! paragraphs sit exactly two characters apart.

use serde::{Deserialize, Serialize};

/// One paragraph of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub page_no: i32,
    /// 1-based position within the page
    pub chunk_no: i32,
    pub text: String,
    pub start_char: i32,
    pub end_char: i32,
}

/// Split one page into trimmed, non-empty paragraph chunks.
pub fn chunk_page_text(page_no: i32, text: &str) -> Vec<Chunk> {
    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks = Vec::with_capacity(paragraphs.len());
    let mut cursor: i32 = 0;
    for (i, para) in paragraphs.iter().enumerate() {
        let len = para.chars().count() as i32;
        chunks.push(Chunk {
            page_no,
            chunk_no: (i + 1) as i32,
            text: (*para).to_string(),
            start_char: cursor,
            end_char: cursor + len,
        });
        cursor += len + 2;
    }

    chunks
}

/// Chunk a sequence of (page number, page text) pairs.
pub fn chunk_pages<'a, I>(pages: I) -> Vec<Chunk>
where
    I: IntoIterator<Item = (i32, &'a str)>,
{
    pages
        .into_iter()
        .flat_map(|(page_no, text)| chunk_page_text(page_no, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_with_offsets() {
        let text = "First paragraph.\n\nSecond one\nwith a wrapped line.\n\n\nThird.";
        let chunks = chunk_page_text(3, text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[0],
            Chunk {
                page_no: 3,
                chunk_no: 1,
                text: "First paragraph.".to_string(),
                start_char: 0,
                end_char: 16,
            }
        );
        // Offsets advance past the two-character separator.
        assert_eq!(chunks[1].start_char, 18);
        assert_eq!(chunks[1].end_char, 49);
        assert_eq!(chunks[2].text, "Third.");
        assert_eq!(chunks[2].chunk_no, 3);
        assert_eq!(chunks[2].start_char, 51);
        assert_eq!(chunks[2].end_char, 57);
    }

    #[test]
    fn empty_and_blank_pages_produce_no_chunks() {
        assert!(chunk_page_text(1, "").is_empty());
        assert!(chunk_page_text(1, "\n\n   \n\n\t\n\n").is_empty());
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let chunks = chunk_page_text(1, "héllo wörld");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_char, 0);
        assert_eq!(chunks[0].end_char, 11);
    }

    #[test]
    fn chunk_numbers_restart_per_page() {
        let chunks = chunk_pages(vec![(1, "A\n\nB"), (2, ""), (3, "C")]);

        assert_eq!(chunks.len(), 3);
        assert_eq!((chunks[0].page_no, chunks[0].chunk_no), (1, 1));
        assert_eq!((chunks[1].page_no, chunks[1].chunk_no), (1, 2));
        assert_eq!((chunks[2].page_no, chunks[2].chunk_no), (3, 1));
    }
}

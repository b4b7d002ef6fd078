//! Splits page-indexed text into fixed-size, page-cited word chunks.
//!
//! A page's trailing chunk that comes up short of `word_length` is not emitted
//! on its own; its words are carried onto the front of the next page and chunked
//! there, so every chunk except possibly the very last one holds exactly
//! `word_length` words. Words are split on runs of whitespace and empty tokens
//! are discarded.

use std::fmt;

use crate::error::DocQaError;
use crate::error::Result;

/// A contiguous run of words from the document, tagged with the page it is cited to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    page_number: usize,
    text: String,
}

impl Chunk {
    pub fn new(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The citation-tagged form handed to embedding and prompt assembly: `[3] "..."`.
    pub fn rendered(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] \"{}\"", self.page_number, self.text)
    }
}

/// Chunk `pages` into windows of `word_length` words.
///
/// `pages[idx]` is cited as page `idx + start_page`.
pub fn chunk_pages<S: AsRef<str>>(
    pages: &[S],
    word_length: usize,
    start_page: usize,
) -> Result<Vec<Chunk>> {
    if word_length == 0 {
        return Err(DocQaError::configuration("word length must be positive"));
    }
    if start_page == 0 {
        return Err(DocQaError::configuration("page numbers start at 1"));
    }
    if start_page.checked_add(pages.len()).is_none() {
        return Err(DocQaError::configuration(format!(
            "start page {start_page} overflows page numbering for {} pages",
            pages.len()
        )));
    }

    let mut chunks = Vec::new();
    let mut carried: Vec<&str> = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_number = idx + start_page;
        let is_last_page = idx + 1 == pages.len();

        let mut words = std::mem::take(&mut carried);
        words.extend(page.as_ref().split_whitespace());

        for window in words.chunks(word_length) {
            if window.len() < word_length && !is_last_page {
                carried = window.to_vec();
                continue;
            }
            chunks.push(Chunk::new(page_number, window.join(" ").trim()));
        }
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rendered(chunks: &[Chunk]) -> Vec<String> {
        chunks.iter().map(Chunk::rendered).collect()
    }

    #[test]
    fn short_tail_is_carried_onto_next_page() {
        let pages = ["the quick brown fox jumps", "over the lazy dog"];
        let chunks = chunk_pages(&pages, 3, 1).unwrap();

        assert_eq!(
            rendered(&chunks),
            vec![
                r#"[1] "the quick brown""#,
                r#"[2] "fox jumps over""#,
                r#"[2] "the lazy dog""#,
            ]
        );
    }

    #[test]
    fn last_page_tail_is_emitted_short() {
        let pages = ["one two three four", "five six seven"];
        let chunks = chunk_pages(&pages, 3, 1).unwrap();

        assert_eq!(
            rendered(&chunks),
            vec![
                r#"[1] "one two three""#,
                r#"[2] "four five six""#,
                r#"[2] "seven""#,
            ]
        );
    }

    #[test]
    fn carry_can_cross_several_pages() {
        let pages = ["a", "b", "c d e"];
        let chunks = chunk_pages(&pages, 4, 1).unwrap();

        assert_eq!(rendered(&chunks), vec![r#"[3] "a b c d""#, r#"[3] "e""#]);
    }

    #[test]
    fn start_page_offsets_citations() {
        let pages = ["alpha beta", "gamma delta"];
        let chunks = chunk_pages(&pages, 2, 10).unwrap();

        assert_eq!(
            chunks,
            vec![Chunk::new(10, "alpha beta"), Chunk::new(11, "gamma delta")]
        );
    }

    #[test]
    fn runs_of_whitespace_never_produce_empty_words() {
        let pages = ["  lots   of\t\tspace \n here  "];
        let chunks = chunk_pages(&pages, 2, 1).unwrap();

        assert_eq!(
            rendered(&chunks),
            vec![r#"[1] "lots of""#, r#"[1] "space here""#]
        );
    }

    #[test]
    fn blank_last_page_still_receives_carried_words() {
        let pages = ["one two three", "   "];
        let chunks = chunk_pages(&pages, 2, 1).unwrap();

        assert_eq!(
            chunks,
            vec![Chunk::new(1, "one two"), Chunk::new(2, "three")]
        );
    }

    #[test]
    fn blank_pages_alone_yield_no_chunks() {
        // Empty tokens are discarded, so there is no empty candidate to emit.
        assert!(chunk_pages(&[""], 5, 1).unwrap().is_empty());
        assert!(chunk_pages(&["   ", "\t\n"], 5, 1).unwrap().is_empty());
    }

    #[test]
    fn start_page_near_usize_max_is_rejected() {
        let err = chunk_pages(&["one", "two"], 3, usize::MAX).unwrap_err();
        assert!(matches!(err, DocQaError::Configuration(_)));

        let err = chunk_pages(&["one"], 3, usize::MAX).unwrap_err();
        assert!(matches!(err, DocQaError::Configuration(_)));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let pages: [&str; 0] = [];
        assert!(chunk_pages(&pages, 5, 1).unwrap().is_empty());
    }

    #[test]
    fn zero_word_length_is_rejected() {
        let err = chunk_pages(&["text"], 0, 1).unwrap_err();
        assert!(matches!(err, DocQaError::Configuration(_)));
    }

    #[test]
    fn zero_start_page_is_rejected() {
        let err = chunk_pages(&["text"], 3, 0).unwrap_err();
        assert!(matches!(err, DocQaError::Configuration(_)));
    }

    fn page_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            prop::collection::vec("[a-z]{1,6}", 0..20).prop_map(|words| words.join(" ")),
            1..6,
        )
    }

    proptest! {
        #[test]
        fn chunk_texts_reassemble_the_word_sequence(
            pages in page_strategy(),
            word_length in 1usize..8,
        ) {
            let chunks = chunk_pages(pages.as_slice(), word_length, 1).unwrap();

            let original: Vec<&str> = pages.iter().flat_map(|p| p.split_whitespace()).collect();
            let rebuilt: Vec<&str> = chunks.iter().flat_map(|c| c.text().split_whitespace()).collect();
            prop_assert_eq!(rebuilt, original);
        }

        #[test]
        fn only_the_final_chunk_may_be_short(
            pages in page_strategy(),
            word_length in 1usize..8,
        ) {
            let chunks = chunk_pages(pages.as_slice(), word_length, 1).unwrap();
            if let Some((_, init)) = chunks.split_last() {
                for chunk in init {
                    prop_assert_eq!(chunk.text().split_whitespace().count(), word_length);
                }
            }
        }

        #[test]
        fn citations_stay_within_the_page_window(
            pages in page_strategy(),
            word_length in 1usize..8,
            start_page in 1usize..50,
        ) {
            let chunks = chunk_pages(pages.as_slice(), word_length, start_page).unwrap();
            let last_page = start_page + pages.len() - 1;

            let mut previous = start_page;
            for chunk in &chunks {
                prop_assert!(chunk.page_number() >= previous);
                prop_assert!(chunk.page_number() <= last_page);
                let expected_prefix = format!("[{}] ", chunk.page_number());
                prop_assert!(chunk.rendered().starts_with(&expected_prefix));
                previous = chunk.page_number();
            }
        }
    }
}

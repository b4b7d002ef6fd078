//! Page text coming out of the (external) extraction step.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Page separator emitted by common PDF-to-text extractors.
pub const PAGE_BREAK: char = '\u{000C}';

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid page range {start}..={end} for a document of {pages} pages")]
    InvalidPageRange {
        start: usize,
        end: usize,
        pages: usize,
    },
}

/// Anything that can hand over a document as one text entry per page.
pub trait DocumentSource: Send + Sync {
    fn pages(&self) -> Result<Vec<String>, DocumentError>;
}

impl DocumentSource for Vec<String> {
    fn pages(&self) -> Result<Vec<String>, DocumentError> {
        Ok(self.clone())
    }
}

/// Collapse newlines and whitespace runs into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pages `start_page..=end_page` (1-based). `None` runs to the last page.
pub fn select_pages(
    pages: Vec<String>,
    start_page: usize,
    end_page: Option<usize>,
) -> Result<Vec<String>, DocumentError> {
    let end = end_page.unwrap_or(pages.len());
    if start_page == 0 || start_page > end || end > pages.len() {
        return Err(DocumentError::InvalidPageRange {
            start: start_page,
            end,
            pages: pages.len(),
        });
    }

    Ok(pages
        .into_iter()
        .skip(start_page - 1)
        .take(end - start_page + 1)
        .collect())
}

/// Extracted plain text with pages separated by form feeds.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = text.len(), "loaded text document");
        Ok(Self::new(text))
    }
}

impl DocumentSource for TextDocument {
    fn pages(&self) -> Result<Vec<String>, DocumentError> {
        let mut pages: Vec<String> = self.text.split(PAGE_BREAK).map(str::to_string).collect();
        // Extractors terminate the final page with a form feed too.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Ok(pages)
    }
}

//! Question answering over one loaded document.
//!
//! ```text
//! DocumentSource ─pages─▶ normalize ─▶ select_pages ─▶ chunk_pages ─▶ Retriever::fit
//!                                                                          │
//! question ─▶ Retriever::query ─top chunks─▶ AnswerComposer ─prompt─▶ CompletionBackend
//! ```
//!
//! The retriever sits behind a read/write lock: loading a document takes the
//! write side, so queries never observe a half-finished fit, while any number
//! of questions can run against the same fitted document concurrently.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::answer::AnswerComposer;
use crate::chunker::chunk_pages;
use crate::completion::CompletionBackend;
use crate::config::DocQaConfig;
use crate::document::DocumentSource;
use crate::document::normalize_whitespace;
use crate::document::select_pages;
use crate::embeddings::EmbeddingProvider;
use crate::error::DocQaError;
use crate::error::Result;
use crate::retriever::QueryResults;
use crate::retriever::Retriever;

/// 1-based inclusive page window; `end: None` runs to the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl Default for PageRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }
}

pub struct DocumentQa {
    config: DocQaConfig,
    retriever: RwLock<Retriever>,
    composer: AnswerComposer,
    backend: Arc<dyn CompletionBackend>,
}

impl DocumentQa {
    /// Fails with [`DocQaError::Config`] when `config` does not pass
    /// [`DocQaConfig::validate`].
    pub fn new(
        config: DocQaConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            retriever: RwLock::new(Retriever::new(embeddings)),
            composer: AnswerComposer::new(),
            backend,
        })
    }

    pub fn with_composer(mut self, composer: AnswerComposer) -> Self {
        self.composer = composer;
        self
    }

    pub const fn config(&self) -> &DocQaConfig {
        &self.config
    }

    /// Load the embedding model. Must complete before any document is loaded.
    pub async fn initialize(&self) -> Result<()> {
        self.retriever.write().await.initialize().await
    }

    pub async fn is_fitted(&self) -> bool {
        self.retriever.read().await.is_fitted()
    }

    /// Chunk `pages` and fit the retriever on them, replacing any loaded document.
    ///
    /// `pages[0]` is cited as the configured `start_page`. Returns the number of
    /// chunks indexed.
    pub async fn load_pages<S: AsRef<str>>(&self, pages: &[S]) -> Result<usize> {
        self.fit_pages(pages, self.config.chunking.start_page).await
    }

    async fn fit_pages<S: AsRef<str>>(&self, pages: &[S], first_page: usize) -> Result<usize> {
        let chunks = chunk_pages(pages, self.config.chunking.word_length, first_page)?;
        let count = chunks.len();

        let retrieval = &self.config.retrieval;
        self.retriever
            .write()
            .await
            .fit(chunks, retrieval.batch_size, retrieval.neighbor_count)
            .await?;

        info!(pages = pages.len(), chunks = count, "document loaded");
        Ok(count)
    }

    /// Pull pages from `source`, normalize their whitespace, keep `range`, and load them.
    ///
    /// Chunks cite the page's position in `source`: with the default
    /// `start_page` of 1, a window starting at page 3 cites its first page as
    /// `[3]`. A different `start_page` shifts every citation by the same offset.
    pub async fn load_document(
        &self,
        source: &dyn DocumentSource,
        range: PageRange,
    ) -> Result<usize> {
        let pages = source
            .pages()?
            .iter()
            .map(|page| normalize_whitespace(page))
            .collect();
        let pages = select_pages(pages, range.start, range.end)?;

        let first_page = range
            .start
            .checked_add(self.config.chunking.start_page - 1)
            .ok_or_else(|| DocQaError::configuration("page window overflows page numbering"))?;
        self.fit_pages(pages.as_slice(), first_page).await
    }

    pub async fn query(&self, text: &str, return_chunk_text: bool) -> Result<QueryResults> {
        self.retriever
            .read()
            .await
            .query(text, return_chunk_text)
            .await
    }

    /// Answer `question` from the loaded document, citing pages.
    pub async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(DocQaError::EmptyQuery);
        }

        let top_chunks = self.retriever.read().await.query_chunks(question).await?;
        let prompt = self.composer.compose(&top_chunks, question)?;
        let answer = self.backend.complete(&prompt).await?;

        info!(chunks = top_chunks.len(), answer_len = answer.len(), "answered question");
        Ok(answer)
    }
}

//! Semantic search over one document's chunks.
//!
//! # Lifecycle
//!
//! ```text
//! new ──initialize()──▶ ready ──fit(corpus)──▶ fitted ──query()…
//!                         ▲                       │
//!                         └──── fit(corpus) ◀─────┘  (full replacement)
//! ```
//!
//! `fit` builds the corpus, its embeddings and the neighbor index off to the
//! side and installs them in one step, so a failed fit leaves whatever was
//! fitted before untouched and never a corpus paired with the wrong vectors.

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::chunker::Chunk;
use crate::embeddings::EmbeddingError;
use crate::embeddings::EmbeddingProvider;
use crate::embeddings::EmbeddingVector;
use crate::error::DocQaError;
use crate::error::Result;
use crate::index::NearestNeighborIndex;

/// Results of [`Retriever::query`], nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResults {
    /// Corpus positions.
    Indices(Vec<usize>),
    /// Citation-tagged chunk strings, `[page] "text"`.
    Chunks(Vec<String>),
}

impl QueryResults {
    pub fn len(&self) -> usize {
        match self {
            QueryResults::Indices(indices) => indices.len(),
            QueryResults::Chunks(chunks) => chunks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct FittedCorpus {
    chunks: Vec<Chunk>,
    index: NearestNeighborIndex,
}

pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    initialized: bool,
    fitted: Option<FittedCorpus>,
}

impl Retriever {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            initialized: false,
            fitted: None,
        }
    }

    /// Load the embedding model. Idempotent.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.provider.load().await?;
        self.initialized = true;
        info!(model = %self.provider.model_id(), "embedding provider initialized");
        Ok(())
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub const fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Chunks of the last successful fit, in corpus order.
    pub fn corpus(&self) -> &[Chunk] {
        self.fitted
            .as_ref()
            .map(|f| f.chunks.as_slice())
            .unwrap_or_default()
    }

    /// Embeddings of the last successful fit, aligned with [`Retriever::corpus`].
    pub fn embeddings(&self) -> &[EmbeddingVector] {
        self.fitted
            .as_ref()
            .map(|f| f.index.embeddings())
            .unwrap_or_default()
    }

    /// Effective neighbor count after clamping to the corpus size.
    pub fn neighbor_count(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.index.neighbor_count())
    }

    pub fn chunk(&self, idx: usize) -> Option<&Chunk> {
        self.corpus().get(idx)
    }

    /// Embed `corpus` in batches of `batch_size` and index it for
    /// `neighbor_count`-nearest lookups.
    ///
    /// A `neighbor_count` larger than the corpus is clamped to the corpus size.
    pub async fn fit(
        &mut self,
        corpus: Vec<Chunk>,
        batch_size: usize,
        neighbor_count: usize,
    ) -> Result<()> {
        if !self.initialized {
            return Err(DocQaError::NotInitialized);
        }
        if batch_size == 0 {
            return Err(DocQaError::configuration("batch size must be positive"));
        }
        if neighbor_count == 0 {
            return Err(DocQaError::configuration("neighbor count must be at least 1"));
        }
        if corpus.is_empty() {
            return Err(DocQaError::EmptyCorpus);
        }

        let texts: Vec<String> = corpus.iter().map(Chunk::rendered).collect();
        let embeddings = match self.embed_all(&texts, batch_size).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                warn!(error = %err, chunks = corpus.len(), "fit aborted, keeping previous state");
                return Err(err);
            }
        };

        let clamped = neighbor_count.min(corpus.len());
        if clamped < neighbor_count {
            warn!(
                requested = neighbor_count,
                clamped, "neighbor count exceeds corpus size, clamping"
            );
        }

        let mut index = NearestNeighborIndex::new(clamped)?;
        index.fit(embeddings)?;

        info!(
            chunks = corpus.len(),
            dimensions = index.dimensions().unwrap_or_default(),
            neighbors = clamped,
            "retriever fitted"
        );
        self.fitted = Some(FittedCorpus {
            chunks: corpus,
            index,
        });
        Ok(())
    }

    async fn embed_all(&self, texts: &[String], batch_size: usize) -> Result<Vec<EmbeddingVector>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
            let vectors = self.embed_checked(batch).await?;
            debug!(batch = batch_no, size = batch.len(), "embedded batch");
            embeddings.extend(vectors);
        }
        Ok(embeddings)
    }

    async fn embed_checked(&self, batch: &[String]) -> Result<Vec<EmbeddingVector>> {
        let vectors = self.provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::BatchLength {
                expected: batch.len(),
                actual: vectors.len(),
            }
            .into());
        }
        Ok(vectors)
    }

    /// Nearest chunks to `text`, as rendered chunk strings or corpus positions.
    pub async fn query(&self, text: &str, return_chunk_text: bool) -> Result<QueryResults> {
        if return_chunk_text {
            self.query_chunks(text).await.map(QueryResults::Chunks)
        } else {
            self.query_indices(text).await.map(QueryResults::Indices)
        }
    }

    /// Corpus positions of the nearest chunks to `text`.
    pub async fn query_indices(&self, text: &str) -> Result<Vec<usize>> {
        let fitted = self.fitted.as_ref().ok_or(DocQaError::NotFitted)?;
        self.nearest(fitted, text).await
    }

    /// Rendered nearest chunks to `text`.
    pub async fn query_chunks(&self, text: &str) -> Result<Vec<String>> {
        let fitted = self.fitted.as_ref().ok_or(DocQaError::NotFitted)?;
        let nearest = self.nearest(fitted, text).await?;
        Ok(nearest
            .into_iter()
            .map(|idx| fitted.chunks[idx].rendered())
            .collect())
    }

    async fn nearest(&self, fitted: &FittedCorpus, text: &str) -> Result<Vec<usize>> {
        let mut vectors = self.embed_checked(&[text.to_string()]).await?;
        let query = vectors.pop().ok_or(EmbeddingError::BatchLength {
            expected: 1,
            actual: 0,
        })?;

        let nearest = fitted.index.kneighbors(&query)?;
        debug!(query = text, hits = ?nearest, "retrieved neighbors");
        Ok(nearest)
    }
}

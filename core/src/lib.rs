//! Page-cited question answering over a single document.
//!
//! A document's pages are cut into fixed-size word chunks tagged with the page
//! they came from, embedded once, and indexed for exact nearest-neighbor search.
//! A question is embedded the same way, its closest chunks are stitched into a
//! prompt, and a completion backend writes the cited answer.
//!
//! Model access sits behind two traits, [`EmbeddingProvider`] and
//! [`CompletionBackend`]; HTTP implementations live in `docqa-openai`.

pub mod answer;
pub mod chunker;
pub mod completion;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod retriever;

pub use answer::AnswerComposer;
pub use chunker::Chunk;
pub use chunker::chunk_pages;
pub use completion::CompletionBackend;
pub use completion::CompletionError;
pub use config::DocQaConfig;
pub use config::api_key_from_env;
pub use document::DocumentError;
pub use document::DocumentSource;
pub use document::TextDocument;
pub use embeddings::EmbeddingError;
pub use embeddings::EmbeddingProvider;
pub use embeddings::EmbeddingVector;
pub use embeddings::HashedEmbeddings;
pub use error::DocQaError;
pub use error::Result;
pub use index::NearestNeighborIndex;
pub use pipeline::DocumentQa;
pub use pipeline::PageRange;
pub use retriever::QueryResults;
pub use retriever::Retriever;

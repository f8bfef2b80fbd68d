//! Segmentation, embedding retrieval, and checklist synthesis for
//! procurement tender documents.
//!
//! ```text
//! Extracted tender text ──► segmenter ──► Vec<Chunk>
//!                                            │
//!              stores::SqliteChunkIndex ◄────┘ (upsert)
//!                          │
//!          retrieval::Retriever (document-scoped / reference corpus)
//!                          │
//!         ┌────────────────┴─────────────────┐
//!         ▼                                  ▼
//! checklist::ChecklistSynthesizer   answer::AnswerOrchestrator
//!         │                                  │
//!         ▼                                  ▼
//!     Checklist                           Answer
//! ```
//!
//! The embedding and generation models are external capabilities injected as
//! trait objects ([`EmbeddingProvider`], [`GenerationProvider`]); build them
//! once per process and share them. [`service::TenderService`] wires the
//! whole pipeline from a [`RagConfig`].

pub mod answer;
pub mod checklist;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod retrieval;
pub mod segmenter;
pub mod service;
pub mod stores;
pub mod types;

pub use answer::{Answer, AnswerOrchestrator, QuestionComplexity, classify_question};
pub use checklist::{Checklist, ChecklistItem, ChecklistSynthesizer, Reference};
pub use config::RagConfig;
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider, OllamaEmbeddingProvider};
pub use generation::{Generated, GenerationProvider, MockGenerationProvider, OllamaClient};
pub use retrieval::{RetrievedChunk, Retriever};
pub use segmenter::{Chunk, Segmenter, SegmenterConfig, UNLABELED_SECTION};
pub use service::TenderService;
pub use stores::{Collection, SqliteChunkIndex};
pub use types::RagError;

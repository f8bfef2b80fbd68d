//! Error taxonomy shared across the crate.
//!
//! Every fallible operation returns [`RagError`]. Missing data is not an
//! error here: a query against an unknown document id yields an empty result,
//! and deleting an unknown document id is a tolerated no-op.

use thiserror::Error;

/// Errors surfaced by segmentation, indexing, retrieval, and model calls.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid configuration, e.g. a window overlap at or above the window size.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Storage layer failure (SQLite or the sqlite-vec extension).
    #[error("storage error: {0}")]
    Storage(String),

    /// Network failure reaching a model service.
    #[error("transport error: {0}")]
    Transport(String),

    /// A model round-trip exceeded its timeout bound.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Model output was not valid structured data where structure was required.
    #[error("unparseable model output: {0}")]
    Parse(String),

    /// Embedding capability failure.
    #[error("embedding error: {0}")]
    Embedding(String),
}

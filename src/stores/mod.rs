//! Vector storage for chunk embeddings.
//!
//! One SQLite database holds two collections: the per-tender partition, where
//! every row belongs to exactly one document id, and the shared regulatory
//! reference corpus queried globally. Nearest-neighbor search runs through
//! the `sqlite-vec` extension with an exact SQL filter for document scoping.

pub mod sqlite;

use serde::{Deserialize, Serialize};

pub use sqlite::SqliteChunkIndex;

/// Named collection inside the index database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    /// Chunks of uploaded tender documents, partitioned by document id.
    Tenders,
    /// Shared regulatory corpus, queried without a document filter.
    Reference,
}

impl Collection {
    pub(crate) fn chunk_table(self) -> &'static str {
        match self {
            Collection::Tenders => "tender_chunks",
            Collection::Reference => "reference_chunks",
        }
    }

    pub(crate) fn embedding_table(self) -> &'static str {
        match self {
            Collection::Tenders => "tender_embeddings",
            Collection::Reference => "reference_embeddings",
        }
    }
}

/// A ranked hit returned by nearest-neighbor search.
///
/// Both retrieval modes return this same shape, so consumers are agnostic to
/// whether a hit came from the tender partition or the reference corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Sequence position of the chunk within its source document.
    pub chunk_id: usize,
    pub text: String,
    pub page: u32,
    pub section: String,
    /// Cosine distance to the query; smaller is closer.
    pub distance: f32,
}

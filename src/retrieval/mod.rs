//! Thin query façade over the embedding index.
//!
//! Two named modes, one result shape: document-scoped search over the tender
//! partition (question answering, checklist reference lookup) and global
//! search over the shared regulatory corpus. Downstream consumers never care
//! which mode produced a hit.

use crate::stores::{Collection, SqliteChunkIndex};
use crate::types::RagError;

pub use crate::stores::RetrievedChunk;

/// Query façade exposing document-scoped and global retrieval.
#[derive(Clone)]
pub struct Retriever {
    index: SqliteChunkIndex,
}

impl Retriever {
    pub fn new(index: SqliteChunkIndex) -> Self {
        Self { index }
    }

    /// Top-`k` chunks of `document_id` nearest to `query`.
    pub async fn search_document(
        &self,
        document_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        self.index
            .query(Collection::Tenders, query, Some(document_id), k)
            .await
    }

    /// Top-`k` chunks of the shared regulatory corpus nearest to `query`.
    pub async fn search_reference(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        self.index
            .query(Collection::Reference, query, None, k)
            .await
    }
}

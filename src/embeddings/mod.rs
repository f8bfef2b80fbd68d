//! Embedding capability: the provider trait plus Ollama-backed and
//! deterministic mock implementations.
//!
//! Providers are stateless and safely reusable across concurrent calls. Build
//! one per process and share it (`Arc<dyn EmbeddingProvider>`); the index and
//! retriever take the shared handle at construction time.

mod mock;
pub mod ollama;

pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;

use async_trait::async_trait;

use crate::types::RagError;

/// Converts batches of text into fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of inputs, returning one vector per input, in order.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Dimensionality of every vector this provider produces.
    fn dimensions(&self) -> usize;

    /// Short identifier for diagnostics.
    fn name(&self) -> &str;
}

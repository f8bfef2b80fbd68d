//! Generation capability: the provider trait plus Ollama-backed and scripted
//! mock implementations.
//!
//! A provider performs exactly one completion per call and reports the token
//! usage the backend measured. Failure kinds are kept distinct (timeout,
//! transport, everything else) so callers can decide how to degrade. No
//! provider retries; retry policy belongs to the caller.

mod mock;
pub mod ollama;
pub mod parse;

pub use mock::MockGenerationProvider;
pub use ollama::OllamaClient;
pub use parse::{JsonExtraction, extract_json_object};

use async_trait::async_trait;

use crate::types::RagError;

/// A completed generation with the usage counters the backend reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Text-completion service invoked with a model identifier and a prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generated, RagError>;
}

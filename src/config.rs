//! Process configuration, loaded once at startup.
//!
//! Model handles and the index connection are expensive to create, so they are
//! built from this config exactly once and shared for the lifetime of the
//! process. Values come from the environment (a `.env` file is honored via
//! `dotenvy`), with defaults matching a local Ollama installation.

use std::path::PathBuf;
use std::time::Duration;

/// Generation calls must run under an explicit timeout bound.
const MIN_GENERATION_TIMEOUT_SECS: u64 = 120;
const MAX_GENERATION_TIMEOUT_SECS: u64 = 300;

/// Runtime configuration for model endpoints and index storage.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Base URL of the Ollama server.
    pub ollama_host: String,
    /// Model used for complex questions, checklist detection, and summaries.
    pub generation_model: String,
    /// Lightweight model used for simple definitional questions.
    pub light_model: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Dimensionality of the embedding model's vectors.
    pub embedding_dimensions: usize,
    /// Location of the SQLite vector index.
    pub index_path: PathBuf,
    /// Timeout for a single generation round-trip, clamped to [120, 300] s.
    pub generation_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost:11434".to_string(),
            generation_model: "llama3.1:latest".to_string(),
            light_model: "llama3.2:3b".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: 768,
            index_path: PathBuf::from("pliego_index.sqlite"),
            generation_timeout: Duration::from_secs(MIN_GENERATION_TIMEOUT_SECS),
        }
    }
}

impl RagConfig {
    /// Builds a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `OLLAMA_HOST`, `OLLAMA_MODEL`,
    /// `OLLAMA_LIGHT_MODEL`, `OLLAMA_EMBEDDING_MODEL`,
    /// `OLLAMA_EMBEDDING_DIMENSIONS`, `RAG_INDEX_PATH`,
    /// `GENERATION_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let timeout_secs = std::env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(MIN_GENERATION_TIMEOUT_SECS)
            .clamp(MIN_GENERATION_TIMEOUT_SECS, MAX_GENERATION_TIMEOUT_SECS);

        Self {
            ollama_host: env_or("OLLAMA_HOST", defaults.ollama_host),
            generation_model: env_or("OLLAMA_MODEL", defaults.generation_model),
            light_model: env_or("OLLAMA_LIGHT_MODEL", defaults.light_model),
            embedding_model: env_or("OLLAMA_EMBEDDING_MODEL", defaults.embedding_model),
            embedding_dimensions: std::env::var("OLLAMA_EMBEDDING_DIMENSIONS")
                .ok()
                .and_then(|raw| raw.parse::<usize>().ok())
                .unwrap_or(defaults.embedding_dimensions),
            index_path: env_or("RAG_INDEX_PATH", "pliego_index.sqlite".to_string()).into(),
            generation_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

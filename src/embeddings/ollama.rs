//! Embedding provider backed by the Ollama `/api/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::types::RagError;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Remote embedding model reachable over HTTP.
///
/// The client is built once and reused; Ollama's embeddings endpoint takes a
/// single prompt per call, so batches are issued sequentially.
#[derive(Clone, Debug)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RagError::Config(err.to_string()))?;
        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        })
    }

    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, RagError> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.host))
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: input,
            })
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::Transport(format!(
                "embedding endpoint returned {status}"
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| RagError::Parse(err.to_string()))?;

        if body.embedding.len() != self.dimensions {
            return Err(RagError::Embedding(format!(
                "model '{}' returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }
        Ok(body.embedding)
    }
}

fn map_request_error(err: reqwest::Error) -> RagError {
    if err.is_timeout() {
        RagError::Timeout(err.to_string())
    } else {
        RagError::Transport(err.to_string())
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for input in inputs {
            vectors.push(self.embed_one(input).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}

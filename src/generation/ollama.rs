//! Generation client for the Ollama `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Generated, GenerationProvider};
use crate::types::RagError;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

/// Blocking-round-trip client for an Ollama server.
///
/// One HTTP client is built at construction and reused for every call. The
/// timeout applies to the whole round-trip; a call that exceeds it fails with
/// [`RagError::Timeout`] rather than hanging.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RagError::Config(err.to_string()))?;
        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generated, RagError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RagError::Timeout(format!("generation with '{model}': {err}"))
                } else {
                    RagError::Transport(format!("generation with '{model}': {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::Transport(format!(
                "generation endpoint returned {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| RagError::Parse(err.to_string()))?;

        tracing::debug!(
            model,
            prompt_tokens = body.prompt_eval_count,
            completion_tokens = body.eval_count,
            "generation completed"
        );

        Ok(Generated {
            text: body.response,
            prompt_tokens: body.prompt_eval_count,
            completion_tokens: body.eval_count,
        })
    }
}

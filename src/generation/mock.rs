//! Scripted generation provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Generated, GenerationProvider};
use crate::types::RagError;

/// A call observed by [`MockGenerationProvider`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
}

/// Replays queued responses and records every call it receives.
///
/// Responses are consumed in FIFO order; once the queue is empty, calls
/// succeed with an empty completion. Errors are queued as the message of the
/// given kind so tests can simulate timeout and transport failures.
#[derive(Default)]
pub struct MockGenerationProvider {
    script: Mutex<VecDeque<Result<Generated, RagError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful completion with zeroed-out usage counters.
    pub fn push_text(&self, text: impl Into<String>) {
        self.push_generated(Generated {
            text: text.into(),
            prompt_tokens: 0,
            completion_tokens: 0,
        });
    }

    /// Queues a successful completion.
    pub fn push_generated(&self, generated: Generated) {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .push_back(Ok(generated));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: RagError) {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .push_back(Err(error));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generated, RagError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
            });
        self.script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(Ok(Generated::default()))
    }
}

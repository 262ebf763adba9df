//! Scripted LLM client for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;

use super::LlmClient;

/// Mock LLM: returns queued responses in order, then repeats the last one.
///
/// Every prompt is recorded so tests can assert on what the node sent.
/// Queue an `Err` with `push_error` to exercise retry paths.
///
/// **Interaction**: Implements `LlmClient`; used by the CLI `mock` backend and tests.
#[derive(Debug, Default)]
pub struct MockLlm {
    queue: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Mock that always answers `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_responses([response.into()])
    }

    /// Mock answering each response once, in order; the last one repeats.
    pub fn with_responses<I, T>(responses: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let queue = responses.into_iter().map(|r| Ok(r.into())).collect();
        Self {
            queue: Mutex::new(queue),
            ..Self::default()
        }
    }

    /// Queues a failing call.
    pub fn push_error(&self, message: impl Into<String>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Err(message.into()));
        }
    }

    /// Queues a successful response.
    pub fn push_response(&self, response: impl Into<String>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Ok(response.into()));
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, prompt: &str) -> Result<String, AgentError> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        let next = self
            .queue
            .lock()
            .map_err(|_| AgentError::Llm("mock queue poisoned".into()))?
            .pop_front();
        let mut last = self
            .last
            .lock()
            .map_err(|_| AgentError::Llm("mock state poisoned".into()))?;
        match next {
            Some(Ok(response)) => {
                *last = Some(response.clone());
                Ok(response)
            }
            Some(Err(message)) => Err(AgentError::Llm(message)),
            None => last
                .clone()
                .ok_or_else(|| AgentError::Llm("mock has no responses".into())),
        }
    }
}

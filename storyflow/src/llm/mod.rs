//! Generative-model client seam used by generation nodes.
//!
//! Nodes hand a fully formatted (and truncated) prompt to an `LlmClient` and
//! get the raw completion text back; parsing stays in the node. `MockLlm`
//! serves scripted responses for tests, `ChatOpenAI` (feature `openai`) calls
//! the Chat Completions API.

mod mock;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;

/// LLM client: given one prompt, returns the completion text.
///
/// **Interaction**: Injected into `GenerateNode` through `workflows::Services`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion call. Failures map to `AgentError::Llm`.
    async fn invoke(&self, prompt: &str) -> Result<String, AgentError>;
}

//! Builds the `Services` bundle (model, store, player, truncator) from config.

use std::sync::Arc;

use async_trait::async_trait;
use storyflow::{
    AgentError, CharTokenizer, InMemoryDocumentStore, Interaction, LlmClient, PromptTruncator,
    Services, StdioInteraction, Tokenizer,
};

use crate::config::{Error, LlmBackend, RunConfig};

/// Offline model: a fixed document for JSON prompts, a fixed sentence otherwise.
#[derive(Debug, Default)]
pub struct CannedLlm;

pub const CANNED_DOCUMENT: &str = r#"{"page_content": "A quiet land waits for its first story.", "metadata": {"genre": "unknown", "gender": "unknown"}}"#;
pub const CANNED_TEXT: &str = "The wind shifts. What do you do?";

#[async_trait]
impl LlmClient for CannedLlm {
    async fn invoke(&self, prompt: &str) -> Result<String, AgentError> {
        let wants_json = prompt.contains("\"page_content\"");
        Ok(if wants_json { CANNED_DOCUMENT } else { CANNED_TEXT }.to_string())
    }
}

fn llm(config: &RunConfig) -> Result<Arc<dyn LlmClient>, Error> {
    match config.backend {
        LlmBackend::Mock => Ok(Arc::new(CannedLlm)),
        #[cfg(feature = "openai")]
        LlmBackend::OpenAi => {
            use async_openai::config::OpenAIConfig;

            let api_key = config
                .api_key
                .clone()
                .ok_or(crate::config::ConfigError::Missing("OPENAI_API_KEY"))?;
            let openai_config = OpenAIConfig::new()
                .with_api_base(&config.api_base)
                .with_api_key(api_key);
            let mut llm = storyflow::ChatOpenAI::with_config(openai_config, config.model.clone())
                .with_max_output_tokens(config.truncation.reserved_output_tokens as u32);
            if let Some(t) = config.temperature {
                llm = llm.with_temperature(t);
            }
            Ok(Arc::new(llm))
        }
        #[cfg(not(feature = "openai"))]
        LlmBackend::OpenAi => Err(crate::config::ConfigError::Invalid {
            name: "LLM_BACKEND",
            value: "openai (built without the openai feature)".into(),
        }
        .into()),
    }
}

fn tokenizer(model: &str) -> Arc<dyn Tokenizer> {
    match storyflow::TiktokenTokenizer::for_model(model) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            tracing::warn!(error = %e, "BPE tokenizer unavailable; counting characters");
            Arc::new(CharTokenizer)
        }
    }
}

/// Builds services for `config`: the configured model, the given store, a
/// terminal interaction and a truncator sized for the model.
pub fn build_services(
    config: &RunConfig,
    store: Arc<InMemoryDocumentStore>,
) -> Result<Services, Error> {
    let interaction: Arc<dyn Interaction> = Arc::new(StdioInteraction::new());
    let truncator = PromptTruncator::new(tokenizer(&config.model), config.truncation.clone())?;
    Ok(Services {
        llm: llm(config)?,
        store,
        interaction,
        truncator: Arc::new(truncator),
    })
}

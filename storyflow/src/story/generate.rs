//! Generation nodes: prompt → truncate → model call → parsed state update.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::graph::Node;
use crate::interaction::Interaction;
use crate::llm::LlmClient;
use crate::state::{ActiveStep, GeneratedDocument, StoryState};
use crate::truncation::PromptTruncator;

use super::prompts;

/// Model-call retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// What a `GenerateNode` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateKind {
    /// World document → `generated`, `active_step = WorldCreation`.
    World,
    /// Lore document → `generated`, `active_step = LoreGeneration`.
    Lore,
    /// Character document → `generated`, `active_step = CharacterCreation`.
    Character,
    /// Text → `world_summary`.
    WorldSummary,
    /// Text → `ai_question`.
    NextPrompt,
    /// Text → `immediate_events`.
    ImmediateEvents,
}

impl GenerateKind {
    pub fn node_id(self) -> &'static str {
        match self {
            GenerateKind::World => "generate_world",
            GenerateKind::Lore => "generate_lore",
            GenerateKind::Character => "generate_character",
            GenerateKind::WorldSummary => "generate_world_summary",
            GenerateKind::NextPrompt => "generate_next_prompt",
            GenerateKind::ImmediateEvents => "generate_immediate_events",
        }
    }

    /// True for kinds that produce a document to save.
    pub fn is_document(self) -> bool {
        matches!(
            self,
            GenerateKind::World | GenerateKind::Lore | GenerateKind::Character
        )
    }
}

/// Parsed model output.
enum Generated {
    Document(GeneratedDocument),
    Text(String),
}

/// Strips markdown fences and surrounding chatter, keeping the outermost JSON object.
fn json_body(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn parse_document(raw: &str) -> Result<GeneratedDocument, AgentError> {
    let doc: GeneratedDocument = serde_json::from_str(json_body(raw))
        .map_err(|e| AgentError::Parse(format!("{}: {}", e, raw.trim())))?;
    if doc.page_content.trim().is_empty() {
        return Err(AgentError::Parse("empty page_content".into()));
    }
    Ok(doc)
}

fn parse(kind: GenerateKind, raw: &str) -> Result<Generated, AgentError> {
    if kind.is_document() {
        return parse_document(raw).map(Generated::Document);
    }
    let text = raw.trim();
    if text.is_empty() {
        return Err(AgentError::Parse("empty completion".into()));
    }
    Ok(Generated::Text(text.to_string()))
}

fn set_meta(doc: &mut GeneratedDocument, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        doc.metadata.insert(key.to_string(), Value::String(v.to_string()));
    }
}

/// Calls the model and writes its parsed output into state.
///
/// Reads: every field used by the kind's prompt (absent fields get
/// defaults). Writes: `generated` + `active_step` for document kinds (plus
/// `create_new_character = true` after a world), or the kind's text field.
/// Identity metadata (`world_id`, `world_name`, `character_id`,
/// `character_name`) is copied from state over whatever the model wrote.
///
/// A failed call or unparseable output is retried up to `max_retries` times;
/// the last error is returned.
pub struct GenerateNode {
    kind: GenerateKind,
    llm: Arc<dyn LlmClient>,
    truncator: Arc<PromptTruncator>,
    interaction: Option<Arc<dyn Interaction>>,
    max_retries: usize,
}

impl GenerateNode {
    pub fn new(kind: GenerateKind, llm: Arc<dyn LlmClient>, truncator: Arc<PromptTruncator>) -> Self {
        Self {
            kind,
            llm,
            truncator,
            interaction: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Announces document generation and shows generated text to the player.
    pub fn with_interaction(mut self, interaction: Arc<dyn Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn call(&self, prompt: &str) -> Result<Generated, AgentError> {
        let mut attempt = 0;
        loop {
            let result = match self.llm.invoke(prompt).await {
                Ok(raw) => parse(self.kind, &raw),
                Err(e) => Err(e),
            };
            match result {
                Ok(generated) => return Ok(generated),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    #[cfg(feature = "tracing")]
                    tracing::warn!(node = self.kind.node_id(), attempt, error = %e, "Retrying model call");
                    #[cfg(not(feature = "tracing"))]
                    let _ = e;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Node<StoryState> for GenerateNode {
    fn id(&self) -> &str {
        self.kind.node_id()
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        if self.kind.is_document() {
            if let Some(io) = &self.interaction {
                io.say("The data is being generated. This may take a few moments.")
                    .await?;
            }
        }

        let prompt = self.truncator.truncate(&prompts::render(self.kind, &state));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            node = self.kind.node_id(),
            prompt_tokens = self.truncator.tokenizer().count(&prompt),
            "Prompt ready"
        );

        match self.call(&prompt).await? {
            Generated::Document(mut doc) => {
                set_meta(&mut doc, "world_id", state.world_id.as_deref());
                match self.kind {
                    GenerateKind::World => {
                        let name = state.world_name.as_deref().map(str::to_lowercase);
                        set_meta(&mut doc, "world_name", name.as_deref());
                        state.active_step = Some(ActiveStep::WorldCreation);
                        state.create_new_character = Some(true);
                    }
                    GenerateKind::Lore => {
                        set_meta(&mut doc, "world_name", state.world_name.as_deref());
                        set_meta(&mut doc, "type", Some("lore"));
                        state.active_step = Some(ActiveStep::LoreGeneration);
                    }
                    _ => {
                        set_meta(&mut doc, "character_id", state.character_id.as_deref());
                        set_meta(&mut doc, "character_name", state.character_name.as_deref());
                        if let Some(gender) = doc.metadata.get("gender").and_then(Value::as_str) {
                            state.character_gender = Some(gender.to_string());
                        }
                        state.character_description = Some(doc.page_content.clone());
                        state.active_step = Some(ActiveStep::CharacterCreation);
                    }
                }
                state.generated = Some(vec![doc]);
            }
            Generated::Text(text) => {
                if let Some(io) = &self.interaction {
                    io.say(&text).await?;
                }
                match self.kind {
                    GenerateKind::WorldSummary => state.world_summary = Some(text),
                    GenerateKind::NextPrompt => state.ai_question = Some(text),
                    _ => state.immediate_events = Some(text),
                }
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedInteraction;
    use crate::llm::MockLlm;
    use crate::truncation::{CharTokenizer, TruncationConfig};

    const WORLD_JSON: &str = r#"{"page_content": "A frozen realm.", "metadata": {"world_name": "Frost", "genre": "fantasy", "magic_presence": true}}"#;

    fn truncator() -> Arc<PromptTruncator> {
        Arc::new(PromptTruncator::new(Arc::new(CharTokenizer), TruncationConfig::default()).unwrap())
    }

    fn node(kind: GenerateKind, llm: Arc<MockLlm>) -> GenerateNode {
        GenerateNode::new(kind, llm, truncator())
    }

    /// **Scenario**: World output becomes a pending document with identity metadata from state.
    #[tokio::test]
    async fn world_generation_writes_generated_document() {
        let llm = Arc::new(MockLlm::new(format!("```json\n{}\n```", WORLD_JSON)));
        let state = StoryState {
            world_id: Some("w1".into()),
            world_name: Some("frost".into()),
            ..Default::default()
        };
        let out = node(GenerateKind::World, llm.clone()).run(state).await.unwrap();
        let docs = out.generated.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "A frozen realm.");
        assert_eq!(docs[0].metadata["world_name"], "frost");
        assert_eq!(docs[0].metadata["world_id"], "w1");
        assert_eq!(docs[0].metadata["magic_presence"], true);
        assert_eq!(out.active_step, Some(ActiveStep::WorldCreation));
        assert_eq!(out.create_new_character, Some(true));
        assert!(llm.prompts()[0].contains("## OBJECTIVE"));
    }

    /// **Scenario**: Garbage output is retried; a later valid answer succeeds.
    #[tokio::test]
    async fn parse_failure_is_retried() {
        let llm = Arc::new(MockLlm::with_responses(["not json", WORLD_JSON]));
        let out = node(GenerateKind::Lore, llm.clone())
            .run(StoryState::default())
            .await
            .unwrap();
        assert_eq!(llm.call_count(), 2);
        assert_eq!(out.active_step, Some(ActiveStep::LoreGeneration));
    }

    /// **Scenario**: After max_retries failures the last error propagates.
    #[tokio::test]
    async fn retries_are_bounded() {
        let llm = Arc::new(MockLlm::default());
        for _ in 0..5 {
            llm.push_error("provider down");
        }
        let err = node(GenerateKind::World, llm.clone())
            .with_max_retries(1)
            .run(StoryState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
        assert_eq!(llm.call_count(), 2);
    }

    /// **Scenario**: Text kinds write their field and show the text when an interaction is set.
    #[tokio::test]
    async fn text_kinds_write_their_field() {
        let llm = Arc::new(MockLlm::new("  The gate looms. What do you do?  "));
        let io = Arc::new(ScriptedInteraction::default());
        let out = node(GenerateKind::NextPrompt, llm)
            .with_interaction(io.clone())
            .run(StoryState::default())
            .await
            .unwrap();
        assert_eq!(out.ai_question.as_deref(), Some("The gate looms. What do you do?"));
        assert_eq!(io.said(), vec!["The gate looms. What do you do?"]);
    }

    /// **Scenario**: Character output fills description and gender.
    #[tokio::test]
    async fn character_generation_fills_character_fields() {
        let llm = Arc::new(MockLlm::new(
            r#"{"page_content": "A tall ranger.", "metadata": {"gender": "female"}}"#,
        ));
        let state = StoryState {
            world_id: Some("w1".into()),
            character_id: Some("c1".into()),
            character_name: Some("ada".into()),
            ..Default::default()
        };
        let out = node(GenerateKind::Character, llm).run(state).await.unwrap();
        assert_eq!(out.character_gender.as_deref(), Some("female"));
        assert_eq!(out.character_description.as_deref(), Some("A tall ranger."));
        let doc = &out.generated.unwrap()[0];
        assert_eq!(doc.metadata["character_id"], "c1");
        assert_eq!(doc.metadata["character_name"], "ada");
        assert_eq!(out.active_step, Some(ActiveStep::CharacterCreation));
    }
}

//! Nodes that write to the document store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::interaction::Interaction;
use crate::state::{ActiveStep, StoryState};
use crate::store::{collections, metadata, Document, DocumentStore};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Collection and keying rule for documents produced at `step`.
///
/// Worlds and characters are keyed by the entity id so later by-id lookups
/// find them; everything else gets a fresh id per document.
fn target(step: Option<ActiveStep>, state: &StoryState) -> (&'static str, Option<String>) {
    match step {
        Some(ActiveStep::WorldCreation) => (
            collections::WORLDS,
            StoryState::non_blank(&state.world_id).map(str::to_string),
        ),
        Some(ActiveStep::CharacterCreation) => (
            collections::CHARACTERS,
            StoryState::non_blank(&state.character_id).map(str::to_string),
        ),
        Some(ActiveStep::LoreGeneration) => (collections::LORES, None),
        Some(ActiveStep::EventRecording) => (collections::EVENTS, None),
        None => (collections::MISC, None),
    }
}

/// Saves `generated` into the collection chosen by `active_step`.
///
/// Reads: `generated`, `active_step`, `world_id`, `character_id`. Writes:
/// clears `generated`. `active_step` is left for `route_after_saving`.
pub struct SaveDocumentsNode {
    store: Arc<dyn DocumentStore>,
    interaction: Option<Arc<dyn Interaction>>,
}

impl SaveDocumentsNode {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            interaction: None,
        }
    }

    /// Shows each saved document to the player.
    pub fn with_interaction(mut self, interaction: Arc<dyn Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

#[async_trait]
impl Node<StoryState> for SaveDocumentsNode {
    fn id(&self) -> &str {
        "save_documents"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let docs = state.generated.take().unwrap_or_default();
        if docs.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "save_documents: nothing generated".into(),
            ));
        }
        let (collection, entity_id) = target(state.active_step, &state);

        for (i, doc) in docs.into_iter().enumerate() {
            let id = match (&entity_id, i) {
                (Some(id), 0) => id.clone(),
                _ => new_id(),
            };
            if let Some(io) = &self.interaction {
                io.say(&doc.page_content).await?;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(collection, id = %id, "Saving document");
            self.store
                .add(collection, Document::new(id, doc.page_content, doc.metadata))
                .await?;
        }
        Ok(state)
    }
}

/// Stores the player's answer to the current question as an event.
///
/// Reads: `world_id`, `character_id`, `ai_question`, `player_answer`.
/// Writes: `active_step = EventRecording`.
pub struct RecordPlayerResponseNode {
    store: Arc<dyn DocumentStore>,
}

impl RecordPlayerResponseNode {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Node<StoryState> for RecordPlayerResponseNode {
    fn id(&self) -> &str {
        "record_player_response"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let answer = StoryState::non_blank(&state.player_answer).ok_or_else(|| {
            AgentError::ExecutionFailed(format!("{}: player_answer is not set", self.id()))
        })?;
        let question = state.ai_question.as_deref().unwrap_or("").trim();
        let text = format!("Question: {}\nAnswer: {}", question, answer);
        let meta = metadata(&[
            ("world_id", state.world_id.as_deref().unwrap_or("")),
            ("character_id", state.character_id.as_deref().unwrap_or("")),
            ("type", "player_response"),
        ]);
        self.store
            .add(collections::EVENTS, Document::new(new_id(), text, meta))
            .await?;
        state.active_step = Some(ActiveStep::EventRecording);
        Ok(state)
    }
}

//! Context retrieval nodes: fill `*_context` fields from the document store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::state::StoryState;
use crate::store::{collections, metadata, DocumentStore};

/// Documents retrieved per similarity search.
pub const CONTEXT_TOP_K: usize = 10;

/// Which context a `ContextNode` retrieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The world document itself, by `world_id`.
    World,
    Lore,
    Character,
    Event,
}

impl ContextKind {
    pub fn node_id(self) -> &'static str {
        match self {
            ContextKind::World => "get_world_context",
            ContextKind::Lore => "get_lore_context",
            ContextKind::Character => "get_character_context",
            ContextKind::Event => "get_event_context",
        }
    }

    /// Text written when nothing is found.
    pub fn empty_text(self) -> &'static str {
        match self {
            ContextKind::World => "No world context available.",
            ContextKind::Lore => "No lore context available.",
            ContextKind::Character => "No character context available.",
            ContextKind::Event => "No event context available.",
        }
    }

    fn collection(self) -> &'static str {
        match self {
            ContextKind::World => collections::WORLDS,
            ContextKind::Lore => collections::LORES,
            ContextKind::Character => collections::CHARACTERS,
            ContextKind::Event => collections::EVENTS,
        }
    }

    fn query(self, state: &StoryState) -> String {
        let world = state.world_name.as_deref().unwrap_or("Unknown World");
        match self {
            ContextKind::World | ContextKind::Lore => format!("Lore about the world {}", world),
            ContextKind::Character => format!("Characters living in the world {}", world),
            ContextKind::Event => format!(
                "Recent events involving {} in the world {}",
                state.character_name.as_deref().unwrap_or("the player"),
                world
            ),
        }
    }

    fn write(self, state: &mut StoryState, text: String) {
        let slot = match self {
            ContextKind::World => &mut state.world_context,
            ContextKind::Lore => &mut state.lore_context,
            ContextKind::Character => &mut state.character_context,
            ContextKind::Event => &mut state.event_context,
        };
        *slot = Some(text);
    }
}

/// Retrieves one kind of context scoped to the current world.
///
/// Reads: `world_id`, `world_name`, `character_name` (event query).
/// Writes: the matching `*_context` field; `ContextKind::empty_text` when
/// nothing is stored or `world_id` is unset.
pub struct ContextNode {
    kind: ContextKind,
    store: Arc<dyn DocumentStore>,
}

impl ContextNode {
    pub fn new(kind: ContextKind, store: Arc<dyn DocumentStore>) -> Self {
        Self { kind, store }
    }

    async fn retrieve(&self, state: &StoryState, world_id: &str) -> Result<Option<String>, AgentError> {
        if self.kind == ContextKind::World {
            let doc = self.store.get(self.kind.collection(), world_id).await?;
            return Ok(doc.map(|d| d.text).filter(|t| !t.trim().is_empty()));
        }
        let hits = self
            .store
            .search(
                self.kind.collection(),
                &self.kind.query(state),
                &metadata(&[("world_id", world_id)]),
                CONTEXT_TOP_K,
            )
            .await?;
        if hits.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            hits.into_iter()
                .map(|h| h.document.text)
                .collect::<Vec<_>>()
                .join("\n"),
        ))
    }
}

#[async_trait]
impl Node<StoryState> for ContextNode {
    fn id(&self) -> &str {
        self.kind.node_id()
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let text = match StoryState::non_blank(&state.world_id) {
            Some(world_id) => self.retrieve(&state, world_id).await?,
            None => None,
        };
        self.kind
            .write(&mut state, text.unwrap_or_else(|| self.kind.empty_text().to_string()));
        Ok(state)
    }
}

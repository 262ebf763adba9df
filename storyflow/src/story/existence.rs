//! Entity-existence checks for worlds and characters.
//!
//! The by-name checks support two outcomes for a conflict (an entity that
//! exists when a new one was requested, or is missing when an existing one
//! was requested). `ExistencePolicy::Branch` records the conflict in state for
//! a router to loop back on; `ExistencePolicy::Fail` aborts the run with
//! `EntityExists` / `EntityMissing`. Each node instance uses exactly one policy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::interaction::Interaction;
use crate::state::StoryState;
use crate::store::{collections, metadata, Document, DocumentStore, Metadata};

/// How a by-name existence conflict is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistencePolicy {
    /// Set the `must_restart_*` flag; the graph routes back to the question.
    Branch,
    /// Return `EntityExists` / `EntityMissing` from the node.
    Fail,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn required<'a>(node: &str, field: &str, value: &'a Option<String>) -> Result<&'a str, AgentError> {
    StoryState::non_blank(value)
        .ok_or_else(|| AgentError::ExecutionFailed(format!("{}: {} is not set", node, field)))
}

enum Conflict {
    Exists,
    Missing,
}

/// Result of comparing "found?" with "wanted new?".
fn conflict(found: bool, wants_new: bool) -> Option<Conflict> {
    match (found, wants_new) {
        (true, true) => Some(Conflict::Exists),
        (false, false) => Some(Conflict::Missing),
        _ => None,
    }
}

fn conflict_error(c: Conflict, kind: &str, name: &str) -> AgentError {
    match c {
        Conflict::Exists => AgentError::EntityExists {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        Conflict::Missing => AgentError::EntityMissing {
            kind: kind.to_string(),
            name: name.to_string(),
        },
    }
}

fn conflict_message(c: &Conflict, kind: &str, name: &str) -> String {
    match c {
        Conflict::Exists => format!(
            "The {} '{}' already exists. Please choose a different name.",
            kind, name
        ),
        Conflict::Missing => format!(
            "The {} '{}' does not exist. Choose a different name or create a new {}.",
            kind, name, kind
        ),
    }
}

/// Looks a world up by name.
///
/// Reads: `world_name`, `create_new_world`, `world_id`. Writes:
/// `must_restart_init`, `create_new_world`, `world_id` (existing id, the
/// preset id, or a fresh UUID).
pub struct CheckWorldExistsNode {
    store: Arc<dyn DocumentStore>,
    policy: ExistencePolicy,
    interaction: Option<Arc<dyn Interaction>>,
}

impl CheckWorldExistsNode {
    pub fn new(store: Arc<dyn DocumentStore>, policy: ExistencePolicy) -> Self {
        Self {
            store,
            policy,
            interaction: None,
        }
    }

    /// Tells the player about a conflict before branching.
    pub fn with_interaction(mut self, interaction: Arc<dyn Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

#[async_trait]
impl Node<StoryState> for CheckWorldExistsNode {
    fn id(&self) -> &str {
        "check_world_exists"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let name = required(self.id(), "world_name", &state.world_name)?.to_string();
        let found = self
            .store
            .find_by_metadata(collections::WORLDS, &metadata(&[("world_name", name.as_str())]))
            .await?
            .into_iter()
            .next();
        let wants_new = state.create_new_world.unwrap_or(false);

        if let Some(c) = conflict(found.is_some(), wants_new) {
            match self.policy {
                ExistencePolicy::Fail => return Err(conflict_error(c, "world", &name)),
                ExistencePolicy::Branch => {
                    if let Some(io) = &self.interaction {
                        io.say(&conflict_message(&c, "world", &name)).await?;
                    }
                    state.must_restart_init = Some(true);
                    return Ok(state);
                }
            }
        }

        state.must_restart_init = Some(false);
        state.create_new_world = Some(found.is_none());
        state.world_id = Some(match found {
            Some(doc) => doc.id,
            None => StoryState::non_blank(&state.world_id)
                .map(str::to_string)
                .unwrap_or_else(new_id),
        });
        Ok(state)
    }
}

/// Loads a world by id.
///
/// Reads: `world_id`. Writes: `world_name`. Fails with `EntityMissing`.
pub struct CheckWorldExistsByIdNode {
    store: Arc<dyn DocumentStore>,
}

impl CheckWorldExistsByIdNode {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Node<StoryState> for CheckWorldExistsByIdNode {
    fn id(&self) -> &str {
        "check_world_exists_by_id"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let id = required(self.id(), "world_id", &state.world_id)?.to_string();
        let doc = self
            .store
            .get(collections::WORLDS, &id)
            .await?
            .ok_or_else(|| AgentError::EntityMissing {
                kind: "world".into(),
                name: id.clone(),
            })?;
        if let Some(name) = doc.meta_str("world_name") {
            state.world_name = Some(name.to_string());
        }
        Ok(state)
    }
}

/// Looks a character up by name within the current world.
///
/// Reads: `world_id`, `character_name`, `create_new_character`,
/// `character_id`. Writes: `must_restart_character`, `create_new_character`,
/// `character_id`.
pub struct CheckCharacterExistsNode {
    store: Arc<dyn DocumentStore>,
    policy: ExistencePolicy,
    interaction: Option<Arc<dyn Interaction>>,
}

impl CheckCharacterExistsNode {
    pub fn new(store: Arc<dyn DocumentStore>, policy: ExistencePolicy) -> Self {
        Self {
            store,
            policy,
            interaction: None,
        }
    }

    pub fn with_interaction(mut self, interaction: Arc<dyn Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

#[async_trait]
impl Node<StoryState> for CheckCharacterExistsNode {
    fn id(&self) -> &str {
        "check_character_exists"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let world_id = required(self.id(), "world_id", &state.world_id)?.to_string();
        let name = required(self.id(), "character_name", &state.character_name)?.to_string();
        let found = self
            .store
            .find_by_metadata(
                collections::CHARACTERS,
                &metadata(&[
                    ("world_id", world_id.as_str()),
                    ("character_name", name.as_str()),
                ]),
            )
            .await?
            .into_iter()
            .next();
        let wants_new = state.create_new_character.unwrap_or(false);

        if let Some(c) = conflict(found.is_some(), wants_new) {
            match self.policy {
                ExistencePolicy::Fail => return Err(conflict_error(c, "character", &name)),
                ExistencePolicy::Branch => {
                    if let Some(io) = &self.interaction {
                        io.say(&conflict_message(&c, "character", &name)).await?;
                    }
                    state.must_restart_character = Some(true);
                    return Ok(state);
                }
            }
        }

        state.must_restart_character = Some(false);
        state.create_new_character = Some(found.is_none());
        state.character_id = Some(match found {
            Some(doc) => doc.id,
            None => StoryState::non_blank(&state.character_id)
                .map(str::to_string)
                .unwrap_or_else(new_id),
        });
        Ok(state)
    }
}

/// Loads a character by id.
///
/// Reads: `character_id`, `world_id`. Writes: `character_name`,
/// `character_gender`, `character_description` (when stored). Fails with
/// `EntityMissing` when absent or when it belongs to another world.
pub struct CheckCharacterExistsByIdNode {
    store: Arc<dyn DocumentStore>,
}

impl CheckCharacterExistsByIdNode {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn belongs_to(doc: &Document, world_id: Option<&str>) -> bool {
    match (world_id, doc.meta_str("world_id")) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => true,
    }
}

#[async_trait]
impl Node<StoryState> for CheckCharacterExistsByIdNode {
    fn id(&self) -> &str {
        "check_character_exists_by_id"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let id = required(self.id(), "character_id", &state.character_id)?.to_string();
        let missing = || AgentError::EntityMissing {
            kind: "character".into(),
            name: id.clone(),
        };
        let doc = self
            .store
            .get(collections::CHARACTERS, &id)
            .await?
            .ok_or_else(missing)?;
        if !belongs_to(&doc, StoryState::non_blank(&state.world_id)) {
            return Err(missing());
        }
        if let Some(name) = doc.meta_str("character_name") {
            state.character_name = Some(name.to_string());
        }
        if let Some(gender) = doc.meta_str("gender") {
            state.character_gender = Some(gender.to_string());
        }
        if state.character_description.is_none() && !doc.text.is_empty() {
            state.character_description = Some(doc.text.clone());
        }
        Ok(state)
    }
}

/// Metadata for a world document named `name`, used by tests and seeding.
pub fn world_metadata(name: &str) -> Metadata {
    metadata(&[("world_name", name)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedInteraction;
    use crate::store::InMemoryDocumentStore;

    async fn store_with_world(name: &str, id: &str) -> Arc<InMemoryDocumentStore> {
        let store = Arc::new(InMemoryDocumentStore::default());
        store
            .add(
                collections::WORLDS,
                Document::new(id, "A world", world_metadata(name)),
            )
            .await
            .unwrap();
        store
    }

    fn wants(name: &str, new: bool) -> StoryState {
        StoryState {
            world_name: Some(name.into()),
            create_new_world: Some(new),
            ..Default::default()
        }
    }

    /// **Scenario**: A new, unused name gets a fresh id and no restart.
    #[tokio::test]
    async fn new_world_gets_fresh_id() {
        let store = store_with_world("eldoria", "w1").await;
        let node = CheckWorldExistsNode::new(store, ExistencePolicy::Fail);
        let out = node.run(wants("frostmark", true)).await.unwrap();
        assert_eq!(out.must_restart_init, Some(false));
        assert_eq!(out.create_new_world, Some(true));
        let id = out.world_id.unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    /// **Scenario**: Joining an existing world picks up its id.
    #[tokio::test]
    async fn existing_world_reuses_id() {
        let store = store_with_world("eldoria", "w1").await;
        let node = CheckWorldExistsNode::new(store, ExistencePolicy::Fail);
        let out = node.run(wants("eldoria", false)).await.unwrap();
        assert_eq!(out.world_id.as_deref(), Some("w1"));
        assert_eq!(out.create_new_world, Some(false));
    }

    /// **Scenario**: Fail policy surfaces conflicts as errors.
    #[tokio::test]
    async fn fail_policy_returns_entity_errors() {
        let store = store_with_world("eldoria", "w1").await;
        let node = CheckWorldExistsNode::new(store, ExistencePolicy::Fail);
        assert!(matches!(
            node.run(wants("eldoria", true)).await,
            Err(AgentError::EntityExists { kind, name }) if kind == "world" && name == "eldoria"
        ));
        assert!(matches!(
            node.run(wants("nowhere", false)).await,
            Err(AgentError::EntityMissing { .. })
        ));
    }

    /// **Scenario**: Branch policy flags a restart and tells the player why.
    #[tokio::test]
    async fn branch_policy_flags_restart() {
        let store = store_with_world("eldoria", "w1").await;
        let io = Arc::new(ScriptedInteraction::default());
        let node =
            CheckWorldExistsNode::new(store, ExistencePolicy::Branch).with_interaction(io.clone());
        let out = node.run(wants("eldoria", true)).await.unwrap();
        assert_eq!(out.must_restart_init, Some(true));
        assert!(out.world_id.is_none());
        assert_eq!(io.said().len(), 1);
        assert!(io.said()[0].contains("already exists"));
    }

    /// **Scenario**: A missing world name is an execution error, not a silent pass.
    #[tokio::test]
    async fn missing_name_is_an_error() {
        let store = Arc::new(InMemoryDocumentStore::default());
        let node = CheckWorldExistsNode::new(store, ExistencePolicy::Branch);
        assert!(matches!(
            node.run(StoryState::default()).await,
            Err(AgentError::ExecutionFailed(_))
        ));
    }

    /// **Scenario**: Lookup by id fills the world name or fails with EntityMissing.
    #[tokio::test]
    async fn world_by_id() {
        let store = store_with_world("eldoria", "w1").await;
        let node = CheckWorldExistsByIdNode::new(store);
        let state = StoryState {
            world_id: Some("w1".into()),
            ..Default::default()
        };
        let out = node.run(state).await.unwrap();
        assert_eq!(out.world_name.as_deref(), Some("eldoria"));
        let state = StoryState {
            world_id: Some("w9".into()),
            ..Default::default()
        };
        assert!(matches!(
            node.run(state).await,
            Err(AgentError::EntityMissing { .. })
        ));
    }

    /// **Scenario**: Characters are scoped by world: the same name elsewhere does not count.
    #[tokio::test]
    async fn character_lookup_is_scoped_by_world() {
        let store = Arc::new(InMemoryDocumentStore::default());
        store
            .add(
                collections::CHARACTERS,
                Document::new(
                    "c1",
                    "A ranger",
                    metadata(&[("world_id", "w1"), ("character_name", "ada"), ("gender", "female")]),
                ),
            )
            .await
            .unwrap();
        let node = CheckCharacterExistsNode::new(store.clone(), ExistencePolicy::Fail);

        let join = StoryState {
            world_id: Some("w1".into()),
            character_name: Some("ada".into()),
            create_new_character: Some(false),
            ..Default::default()
        };
        let out = node.run(join).await.unwrap();
        assert_eq!(out.character_id.as_deref(), Some("c1"));

        let elsewhere = StoryState {
            world_id: Some("w2".into()),
            character_name: Some("ada".into()),
            create_new_character: Some(true),
            ..Default::default()
        };
        let out = node.run(elsewhere).await.unwrap();
        assert_ne!(out.character_id.as_deref(), Some("c1"));

        let by_id = CheckCharacterExistsByIdNode::new(store);
        let state = StoryState {
            world_id: Some("w1".into()),
            character_id: Some("c1".into()),
            ..Default::default()
        };
        let out = by_id.run(state).await.unwrap();
        assert_eq!(out.character_name.as_deref(), Some("ada"));
        assert_eq!(out.character_gender.as_deref(), Some("female"));
        assert_eq!(out.character_description.as_deref(), Some("A ranger"));

        let wrong_world = StoryState {
            world_id: Some("w2".into()),
            character_id: Some("c1".into()),
            ..Default::default()
        };
        assert!(matches!(
            by_id.run(wrong_world).await,
            Err(AgentError::EntityMissing { .. })
        ));
    }
}

//! Per-operation graph assemblies.
//!
//! Each function wires catalog nodes from `story` into a `StateGraph` built
//! from one `Services` bundle. `Operation::compile` is what the CLI uses; the
//! per-operation functions return the uncompiled graph so callers can attach
//! middleware first.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::{CompilationError, CompiledStateGraph, GraphError, Node, StateGraph, END};
use crate::interaction::Interaction;
use crate::llm::LlmClient;
use crate::state::{Source, StoryState};
use crate::store::DocumentStore;
use crate::story::routers::{self, labels};
use crate::story::{
    AskField, AskNode, AskQuestionNode, CheckCharacterExistsByIdNode, CheckCharacterExistsNode,
    CheckWorldExistsByIdNode, CheckWorldExistsNode, CollectAnswerNode, ContextKind, ContextNode,
    ExistencePolicy, GenerateKind, GenerateNode, Question, RecordPlayerResponseNode,
    SaveDocumentsNode,
};
use crate::truncation::PromptTruncator;

/// Collaborators shared by every node of an assembled graph.
#[derive(Clone)]
pub struct Services {
    pub llm: Arc<dyn LlmClient>,
    pub store: Arc<dyn DocumentStore>,
    pub interaction: Arc<dyn Interaction>,
    pub truncator: Arc<PromptTruncator>,
}

impl Services {
    fn generate(&self, kind: GenerateKind) -> GenerateNode {
        GenerateNode::new(kind, self.llm.clone(), self.truncator.clone())
    }

    fn context(&self, kind: ContextKind) -> ContextNode {
        ContextNode::new(kind, self.store.clone())
    }

    fn ask(&self, field: AskField) -> AskNode {
        AskNode::new(field, self.interaction.clone())
    }
}

/// Failure while assembling a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Compile(#[from] CompilationError),
}

/// Registers `node` under its own id.
fn register<N>(graph: &mut StateGraph<StoryState>, node: N) -> Result<(), GraphError>
where
    N: Node<StoryState> + 'static,
{
    let id = node.id().to_string();
    graph.add_node(id, Arc::new(node))?;
    Ok(())
}

/// Adds `a -> b -> c ...` for consecutive pairs.
fn chain(graph: &mut StateGraph<StoryState>, ids: &[&str]) -> Result<(), GraphError> {
    for pair in ids.windows(2) {
        graph.add_edge(pair[0], pair[1])?;
    }
    Ok(())
}

/// The looping terminal session: choose or create a world, then a
/// character, then print a world summary.
///
/// Conflicts branch back to the relevant question instead of failing.
pub fn interactive_session(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let io = services.interaction.clone();
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, services.ask(AskField::NewWorld))?;
    register(&mut g, services.ask(AskField::WorldName))?;
    register(
        &mut g,
        CheckWorldExistsNode::new(store.clone(), ExistencePolicy::Branch).with_interaction(io.clone()),
    )?;
    register(&mut g, services.ask(AskField::WorldGenre))?;
    register(&mut g, services.ask(AskField::StoryDirectives))?;
    register(&mut g, services.generate(GenerateKind::World).with_interaction(io.clone()))?;
    register(&mut g, SaveDocumentsNode::new(store.clone()).with_interaction(io.clone()))?;
    register(&mut g, services.context(ContextKind::World))?;
    register(&mut g, services.context(ContextKind::Lore))?;
    register(&mut g, services.generate(GenerateKind::Lore).with_interaction(io.clone()))?;
    register(&mut g, services.ask(AskField::NewCharacter))?;
    register(&mut g, services.ask(AskField::CharacterName))?;
    register(
        &mut g,
        CheckCharacterExistsNode::new(store, ExistencePolicy::Branch).with_interaction(io.clone()),
    )?;
    register(&mut g, services.generate(GenerateKind::Character).with_interaction(io.clone()))?;
    register(&mut g, services.context(ContextKind::Character))?;
    register(&mut g, services.generate(GenerateKind::WorldSummary).with_interaction(io))?;

    g.set_entry("ask_if_new_world")?;
    g.add_edge("ask_if_new_world", "ask_world_name")?;
    g.add_conditional_edges(
        "ask_world_name",
        routers::input_validity,
        [
            (labels::VALID, "check_world_exists"),
            (labels::INVALID, "ask_world_name"),
        ],
    )?;
    g.add_conditional_edges(
        "check_world_exists",
        routers::route_world_creation,
        [
            (labels::MUST_RESTART_INIT, "ask_if_new_world"),
            (labels::MUST_CONFIGURE, "ask_world_genre"),
            (labels::EXISTS, "get_world_context"),
        ],
    )?;
    chain(
        &mut g,
        &["ask_world_genre", "ask_story_directives", "generate_world", "save_documents"],
    )?;
    chain(
        &mut g,
        &["get_world_context", "get_lore_context", "generate_lore", "save_documents"],
    )?;
    g.add_conditional_edges(
        "save_documents",
        routers::route_after_saving,
        [
            (labels::FROM_WORLD, "ask_character_name"),
            (labels::FROM_LORE, "ask_if_new_character"),
            (labels::FROM_CHARACTER, "get_character_context"),
        ],
    )?;
    g.add_edge("ask_if_new_character", "ask_character_name")?;
    g.add_conditional_edges(
        "ask_character_name",
        routers::input_validity,
        [
            (labels::VALID, "check_character_exists"),
            (labels::INVALID, "ask_character_name"),
        ],
    )?;
    g.add_conditional_edges(
        "check_character_exists",
        routers::route_character_creation,
        [
            (labels::MUST_RESTART_CHARACTER, "ask_if_new_character"),
            (labels::MUST_CONFIGURE, "generate_character"),
            (labels::EXISTS, "get_character_context"),
        ],
    )?;
    g.add_edge("generate_character", "save_documents")?;
    chain(
        &mut g,
        &["get_character_context", "generate_world_summary", END],
    )?;
    Ok(g)
}

/// New world: generate and save it, then one piece of lore, then a summary.
///
/// Fails with `EntityExists` when the name is taken.
pub fn create_world(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsNode::new(store.clone(), ExistencePolicy::Fail))?;
    register(&mut g, services.generate(GenerateKind::World))?;
    register(&mut g, SaveDocumentsNode::new(store))?;
    register(&mut g, services.context(ContextKind::World))?;
    register(&mut g, services.context(ContextKind::Lore))?;
    register(&mut g, services.generate(GenerateKind::Lore))?;
    register(&mut g, services.generate(GenerateKind::WorldSummary))?;

    g.set_entry("check_world_exists")?;
    chain(&mut g, &["check_world_exists", "generate_world", "save_documents"])?;
    g.add_conditional_edges(
        "save_documents",
        routers::route_after_saving,
        [
            (labels::FROM_WORLD, "get_world_context"),
            (labels::FROM_LORE, "generate_world_summary"),
        ],
    )?;
    chain(
        &mut g,
        &["get_world_context", "get_lore_context", "generate_lore", "save_documents"],
    )?;
    g.add_edge("generate_world_summary", END)?;
    Ok(g)
}

/// New character in an existing world (by id).
pub fn create_character(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsByIdNode::new(store.clone()))?;
    register(&mut g, CheckCharacterExistsNode::new(store.clone(), ExistencePolicy::Fail))?;
    register(&mut g, services.context(ContextKind::World))?;
    register(&mut g, services.context(ContextKind::Lore))?;
    register(&mut g, services.generate(GenerateKind::Character))?;
    register(&mut g, SaveDocumentsNode::new(store))?;

    g.set_entry("check_world_exists_by_id")?;
    chain(
        &mut g,
        &[
            "check_world_exists_by_id",
            "check_character_exists",
            "get_world_context",
            "get_lore_context",
            "generate_character",
            "save_documents",
            END,
        ],
    )?;
    Ok(g)
}

/// Existing character joins an existing world (both by name).
pub fn join_game(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsNode::new(store.clone(), ExistencePolicy::Fail))?;
    register(&mut g, CheckCharacterExistsNode::new(store, ExistencePolicy::Fail))?;
    register(&mut g, services.context(ContextKind::World))?;
    register(&mut g, services.context(ContextKind::Lore))?;
    register(&mut g, services.context(ContextKind::Character))?;
    register(&mut g, services.generate(GenerateKind::WorldSummary))?;

    g.set_entry("check_world_exists")?;
    chain(
        &mut g,
        &[
            "check_world_exists",
            "check_character_exists",
            "get_world_context",
            "get_lore_context",
            "get_character_context",
            "generate_world_summary",
            END,
        ],
    )?;
    Ok(g)
}

/// Next question for the player, from the full context and recent events.
pub fn next_prompt(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsByIdNode::new(store.clone()))?;
    register(&mut g, CheckCharacterExistsByIdNode::new(store))?;
    for kind in [
        ContextKind::World,
        ContextKind::Lore,
        ContextKind::Character,
        ContextKind::Event,
    ] {
        register(&mut g, services.context(kind))?;
    }
    register(&mut g, services.generate(GenerateKind::NextPrompt))?;

    g.set_entry("check_world_exists_by_id")?;
    chain(
        &mut g,
        &[
            "check_world_exists_by_id",
            "check_character_exists_by_id",
            "get_world_context",
            "get_lore_context",
            "get_character_context",
            "get_event_context",
            "generate_next_prompt",
            END,
        ],
    )?;
    Ok(g)
}

/// Records the player's answer and narrates its immediate consequences.
pub fn register_action(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let store = services.store.clone();
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsByIdNode::new(store.clone()))?;
    register(&mut g, CheckCharacterExistsByIdNode::new(store.clone()))?;
    register(&mut g, services.context(ContextKind::Event))?;
    register(&mut g, RecordPlayerResponseNode::new(store))?;
    register(&mut g, services.generate(GenerateKind::ImmediateEvents))?;

    g.set_entry("check_world_exists_by_id")?;
    chain(
        &mut g,
        &[
            "check_world_exists_by_id",
            "check_character_exists_by_id",
            "get_event_context",
            "record_player_response",
            "generate_immediate_events",
            END,
        ],
    )?;
    Ok(g)
}

/// Summary of a world (by id) and the characters in it.
pub fn world_synopsis(services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
    let mut g = StateGraph::new();

    register(&mut g, CheckWorldExistsByIdNode::new(services.store.clone()))?;
    for kind in [ContextKind::World, ContextKind::Lore, ContextKind::Character] {
        register(&mut g, services.context(kind))?;
    }
    register(&mut g, services.generate(GenerateKind::WorldSummary))?;

    g.set_entry("check_world_exists_by_id")?;
    chain(
        &mut g,
        &[
            "check_world_exists_by_id",
            "get_world_context",
            "get_lore_context",
            "get_character_context",
            "generate_world_summary",
            END,
        ],
    )?;
    Ok(g)
}

/// Asks every question in `questions` in order, collecting keyed answers.
pub fn question_loop(
    services: &Services,
    questions: Vec<Question>,
) -> Result<StateGraph<StoryState>, GraphError> {
    let total = questions.len();
    let questions = Arc::new(questions);
    let mut g = StateGraph::new();

    register(&mut g, AskQuestionNode::new(questions.clone()))?;
    register(
        &mut g,
        CollectAnswerNode::new(questions, services.interaction.clone()),
    )?;

    g.set_entry("ask_question")?;
    g.add_edge("ask_question", "collect_answer")?;
    g.add_conditional_edges(
        "collect_answer",
        routers::questions_remaining(total),
        [(labels::CONTINUE, "ask_question"), (labels::END, END)],
    )?;
    Ok(g)
}

/// One user-facing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    InteractiveSession,
    CreateWorld,
    CreateCharacter,
    JoinGame,
    NextPrompt,
    RegisterAction,
    WorldSynopsis,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::InteractiveSession => "interactive_session",
            Operation::CreateWorld => "create_world",
            Operation::CreateCharacter => "create_character",
            Operation::JoinGame => "join_game",
            Operation::NextPrompt => "next_prompt",
            Operation::RegisterAction => "register_action",
            Operation::WorldSynopsis => "world_synopsis",
        }
    }

    pub fn build(self, services: &Services) -> Result<StateGraph<StoryState>, GraphError> {
        match self {
            Operation::InteractiveSession => interactive_session(services),
            Operation::CreateWorld => create_world(services),
            Operation::CreateCharacter => create_character(services),
            Operation::JoinGame => join_game(services),
            Operation::NextPrompt => next_prompt(services),
            Operation::RegisterAction => register_action(services),
            Operation::WorldSynopsis => world_synopsis(services),
        }
    }

    pub fn compile(
        self,
        services: &Services,
    ) -> Result<CompiledStateGraph<StoryState>, WorkflowError> {
        Ok(self.build(services)?.compile()?)
    }

    /// Whether the operation talks to the player through `Interaction`.
    pub fn is_interactive(self) -> bool {
        matches!(self, Operation::InteractiveSession)
    }
}

/// Seed state for `create_world`.
pub fn seed_create_world(
    world_name: &str,
    genre: Option<&str>,
    directives: Option<&str>,
) -> StoryState {
    StoryState {
        source: Some(Source::Api),
        create_new_world: Some(true),
        world_name: Some(world_name.trim().to_lowercase()),
        world_genre: genre.map(str::to_string),
        story_directives: directives.map(str::to_string),
        ..Default::default()
    }
}

/// Seed state for `create_character`.
pub fn seed_create_character(world_id: &str, character_name: &str) -> StoryState {
    StoryState {
        source: Some(Source::Api),
        world_id: Some(world_id.to_string()),
        create_new_character: Some(true),
        character_name: Some(character_name.trim().to_lowercase()),
        ..Default::default()
    }
}

/// Seed state for `join_game`.
pub fn seed_join_game(world_name: &str, character_name: &str) -> StoryState {
    StoryState {
        source: Some(Source::Api),
        create_new_world: Some(false),
        world_name: Some(world_name.trim().to_lowercase()),
        create_new_character: Some(false),
        character_name: Some(character_name.trim().to_lowercase()),
        ..Default::default()
    }
}

/// Seed state for the by-id gameplay operations.
pub fn seed_by_ids(world_id: &str, character_id: Option<&str>) -> StoryState {
    StoryState {
        source: Some(Source::Api),
        world_id: Some(world_id.to_string()),
        character_id: character_id.map(str::to_string),
        ..Default::default()
    }
}

//! Story node catalog and routers.
//!
//! Every node is a `Node<StoryState>` with a fixed id; `workflows` wires them
//! into per-operation graphs. Collaborators (model, store, player) are
//! injected as trait objects.

mod ask;
mod context;
mod existence;
mod generate;
mod persist;
pub mod prompts;
mod questions;
pub mod routers;

pub use ask::{AskField, AskNode, RANDOM_DIRECTIVES, RANDOM_GENRE};
pub use context::{ContextKind, ContextNode, CONTEXT_TOP_K};
pub use existence::{
    world_metadata, CheckCharacterExistsByIdNode, CheckCharacterExistsNode,
    CheckWorldExistsByIdNode, CheckWorldExistsNode, ExistencePolicy,
};
pub use generate::{GenerateKind, GenerateNode, DEFAULT_MAX_RETRIES};
pub use persist::{RecordPlayerResponseNode, SaveDocumentsNode};
pub use questions::{
    character_creation_questions, world_building_questions, AskQuestionNode, CollectAnswerNode,
    Question,
};

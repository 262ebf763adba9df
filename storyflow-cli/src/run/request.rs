//! One CLI operation with its arguments.

use storyflow::workflows::{
    seed_by_ids, seed_create_character, seed_create_world, seed_join_game, Operation,
};
use storyflow::{Language, Source, StoryState};

/// Operation plus the arguments that seed its initial state.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Interactive,
    CreateWorld {
        world_name: String,
        genre: Option<String>,
        directives: Option<String>,
    },
    CreateCharacter {
        world_id: String,
        character_name: String,
    },
    JoinGame {
        world_name: String,
        character_name: String,
    },
    NextPrompt {
        world_id: String,
        character_id: String,
    },
    RegisterAction {
        world_id: String,
        character_id: String,
        question: Option<String>,
        answer: String,
    },
    WorldSynopsis {
        world_id: String,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Interactive => Operation::InteractiveSession,
            Request::CreateWorld { .. } => Operation::CreateWorld,
            Request::CreateCharacter { .. } => Operation::CreateCharacter,
            Request::JoinGame { .. } => Operation::JoinGame,
            Request::NextPrompt { .. } => Operation::NextPrompt,
            Request::RegisterAction { .. } => Operation::RegisterAction,
            Request::WorldSynopsis { .. } => Operation::WorldSynopsis,
        }
    }

    /// Initial state for the request's graph.
    pub fn seed(&self, language: Language) -> StoryState {
        let mut state = match self {
            Request::Interactive => StoryState {
                source: Some(Source::Cli),
                ..Default::default()
            },
            Request::CreateWorld {
                world_name,
                genre,
                directives,
            } => seed_create_world(world_name, genre.as_deref(), directives.as_deref()),
            Request::CreateCharacter {
                world_id,
                character_name,
            } => seed_create_character(world_id, character_name),
            Request::JoinGame {
                world_name,
                character_name,
            } => seed_join_game(world_name, character_name),
            Request::NextPrompt {
                world_id,
                character_id,
            } => seed_by_ids(world_id, Some(character_id)),
            Request::RegisterAction {
                world_id,
                character_id,
                question,
                answer,
            } => StoryState {
                ai_question: question.clone(),
                player_answer: Some(answer.clone()),
                ..seed_by_ids(world_id, Some(character_id))
            },
            Request::WorldSynopsis { world_id } => seed_by_ids(world_id, None),
        };
        state.language = Some(language);
        state
    }
}

//! Nodes that collect one answer from the player.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::interaction::Interaction;
use crate::state::StoryState;

/// Fallback written when the genre answer is blank.
pub const RANDOM_GENRE: &str = "Choose a random genre";
/// Fallback written when the directives answer is blank.
pub const RANDOM_DIRECTIVES: &str = "Choose random directives";

/// Which state field an `AskNode` fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskField {
    /// y/yes/o/oui → `create_new_world = true`.
    NewWorld,
    /// Lowercased into `world_name`.
    WorldName,
    /// `world_genre`; blank → `RANDOM_GENRE`.
    WorldGenre,
    /// `story_directives`; blank → `RANDOM_DIRECTIVES`.
    StoryDirectives,
    /// y/yes/o/oui → `create_new_character = true`.
    NewCharacter,
    /// Lowercased into `character_name`.
    CharacterName,
    /// Raw answer into `player_answer`.
    PlayerAnswer,
}

impl AskField {
    pub fn node_id(self) -> &'static str {
        match self {
            AskField::NewWorld => "ask_if_new_world",
            AskField::WorldName => "ask_world_name",
            AskField::WorldGenre => "ask_world_genre",
            AskField::StoryDirectives => "ask_story_directives",
            AskField::NewCharacter => "ask_if_new_character",
            AskField::CharacterName => "ask_character_name",
            AskField::PlayerAnswer => "ask_player_answer",
        }
    }

    fn cue(self, state: &StoryState) -> String {
        match self {
            AskField::NewWorld => "Do you want to create a new world? (y/n)".to_string(),
            AskField::WorldName if state.create_new_world.unwrap_or(false) => {
                "What would you like to name your world? Choose a name that reflects its \
                 history, culture or dominant species, or simply something that sounds \
                 powerful, mystical or poetic."
                    .to_string()
            }
            AskField::WorldName => {
                "Which existing world would you like to enter?".to_string()
            }
            AskField::WorldGenre => "Describe the world's main genre: hopeful or grim, ancient \
                 or futuristic, magical or technological? (Leave blank for a random genre)"
                .to_string(),
            AskField::StoryDirectives => {
                "Are there particular themes or narrative threads you'd like to explore? \
                 (Leave blank for random narrative threads)"
                    .to_string()
            }
            AskField::NewCharacter => "Do you want to create a new character? (y/n)".to_string(),
            AskField::CharacterName if state.create_new_character.unwrap_or(false) => {
                "What is the name of your character?".to_string()
            }
            AskField::CharacterName => {
                "What is the name of the character you want to play?".to_string()
            }
            AskField::PlayerAnswer => state
                .ai_question
                .clone()
                .unwrap_or_else(|| "What do you do?".to_string()),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui"
    )
}

/// Asks one question and writes the answer.
///
/// Reads: `create_new_world`, `create_new_character`, `ai_question` (cue
/// wording). Writes: the field named by `AskField` and `user_input` (the
/// trimmed raw answer).
pub struct AskNode {
    field: AskField,
    interaction: Arc<dyn Interaction>,
}

impl AskNode {
    pub fn new(field: AskField, interaction: Arc<dyn Interaction>) -> Self {
        Self { field, interaction }
    }
}

#[async_trait]
impl Node<StoryState> for AskNode {
    fn id(&self) -> &str {
        self.field.node_id()
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let raw = self.interaction.ask(&self.field.cue(&state)).await?;
        let answer = raw.trim().to_string();

        match self.field {
            AskField::NewWorld => state.create_new_world = Some(is_yes(&answer)),
            AskField::WorldName => state.world_name = Some(answer.to_lowercase()),
            AskField::WorldGenre => {
                state.world_genre = Some(if answer.is_empty() {
                    RANDOM_GENRE.to_string()
                } else {
                    answer.clone()
                })
            }
            AskField::StoryDirectives => {
                state.story_directives = Some(if answer.is_empty() {
                    RANDOM_DIRECTIVES.to_string()
                } else {
                    answer.clone()
                })
            }
            AskField::NewCharacter => state.create_new_character = Some(is_yes(&answer)),
            AskField::CharacterName => state.character_name = Some(answer.to_lowercase()),
            AskField::PlayerAnswer => state.player_answer = Some(answer.clone()),
        }
        state.user_input = Some(answer);
        Ok(state)
    }
}

//! Prompt templates for the generation nodes.
//!
//! Every prompt is a list of `## ` sections so `PromptTruncator` can shrink
//! the long context sections while keeping the instructions intact.

use crate::state::StoryState;

use super::generate::GenerateKind;

/// Builder for `## `-sectioned prompts.
#[derive(Debug, Default)]
pub struct Prompt {
    sections: Vec<(String, String)>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, title: &str, body: impl Into<String>) -> Self {
        self.sections.push((title.to_string(), body.into()));
        self
    }

    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|(title, body)| format!("## {}\n{}", title, body.trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn field<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    StoryState::non_blank(value).unwrap_or(default)
}

const JSON_RULES: &str = "- Do not include explanations, comments or markdown fences.\n\
- Output a single raw JSON object with the keys \"page_content\" (string) and \"metadata\" (object of strings and booleans).";

/// Renders the prompt for `kind` from `state`; absent fields get defaults.
pub fn render(kind: GenerateKind, state: &StoryState) -> String {
    let world_name = field(&state.world_name, "World name not provided. Generate a default name.");
    let language = format!("Write every natural-language value in {}.", state.language().name());
    let world_context = field(&state.world_context, "No world context available.");
    let lore_context = field(&state.lore_context, "No lore context available.");
    let character_context = field(&state.character_context, "No character context available.");
    let event_context = field(&state.event_context, "No event context available.");

    let prompt = match kind {
        GenerateKind::World => Prompt::new()
            .section("ROLE", "You are a narrative generator for a procedural RPG game.")
            .section(
                "OBJECTIVE",
                format!("Generate an overview of the world \"{}\".", world_name),
            )
            .section(
                "CREATIVE EXPECTATIONS",
                format!(
                    "- The theme / genre of the world must respect: {}\n- Respect the following directives: {}",
                    field(&state.world_genre, "fantasy"),
                    field(
                        &state.story_directives,
                        "No specific directives provided. Generate a general narrative."
                    ),
                ),
            )
            .section(
                "FORMAT",
                format!(
                    "{}\n- page_content: a short descriptive paragraph introducing the world.\n\
                     - metadata: world_name (\"{}\" in lowercase), genre, dominant_species, magic_presence (true/false), governance.\n- {}",
                    JSON_RULES,
                    world_name.to_lowercase(),
                    language
                ),
            ),
        GenerateKind::Lore => Prompt::new()
            .section(
                "ROLE",
                "You are a lorewriter for a procedural RPG game. You expand the myth, history or secret truths of a world.",
            )
            .section(
                "OBJECTIVE",
                format!(
                    "Write a rich, standalone paragraph of lore for the world \"{}\".",
                    world_name
                ),
            )
            .section("WORLD CONTEXT", world_context)
            .section("EXISTING LORE", lore_context)
            .section(
                "FORMAT",
                format!(
                    "{}\n- page_content: one dense, evocative lore paragraph.\n\
                     - metadata: world_name, world_id, type (\"lore\"), theme, tags.\n- {}",
                    JSON_RULES, language
                ),
            ),
        GenerateKind::Character => Prompt::new()
            .section("ROLE", "You are a character designer for a procedural RPG game.")
            .section(
                "OBJECTIVE",
                format!(
                    "Create the playable character \"{}\" living in the world \"{}\".",
                    field(&state.character_name, "Unnamed hero"),
                    world_name
                ),
            )
            .section(
                "PLAYER WISHES",
                format!(
                    "- Gender: {}\n- Description: {}",
                    field(&state.character_gender, "Choose freely"),
                    field(&state.character_description, "Choose freely")
                ),
            )
            .section("WORLD CONTEXT", world_context)
            .section("LORE CONTEXT", lore_context)
            .section(
                "FORMAT",
                format!(
                    "{}\n- page_content: a paragraph describing the character's appearance, past and motives.\n\
                     - metadata: character_name, gender, race, class, world_id.\n- {}",
                    JSON_RULES, language
                ),
            ),
        GenerateKind::WorldSummary => Prompt::new()
            .section("ROLE", "You are a narrator for a procedural RPG game.")
            .section(
                "OBJECTIVE",
                format!(
                    "Summarise the world \"{}\" for a player about to start playing, ending on the tensions they may get involved in.",
                    world_name
                ),
            )
            .section("WORLD CONTEXT", world_context)
            .section("LORE CONTEXT", lore_context)
            .section("CHARACTER CONTEXT", character_context)
            .section("FORMAT", format!("- Plain prose, no markdown.\n- {}", language)),
        GenerateKind::NextPrompt => Prompt::new()
            .section("ROLE", "You are the game master of a procedural RPG game.")
            .section(
                "OBJECTIVE",
                format!(
                    "Describe the next situation for {} and end with one question asking what they do.",
                    field(&state.character_name, "the player")
                ),
            )
            .section("WORLD CONTEXT", world_context)
            .section("LORE CONTEXT", lore_context)
            .section("CHARACTER CONTEXT", character_context)
            .section("RECENT EVENTS", event_context)
            .section("FORMAT", format!("- Plain prose, no markdown.\n- {}", language)),
        GenerateKind::ImmediateEvents => Prompt::new()
            .section("ROLE", "You are the game master of a procedural RPG game.")
            .section(
                "OBJECTIVE",
                "Narrate the immediate consequences of the player's action in a few sentences.",
            )
            .section(
                "PLAYER ACTION",
                format!(
                    "- Question: {}\n- Answer: {}",
                    field(&state.ai_question, "No question recorded."),
                    field(&state.player_answer, "The player hesitates.")
                ),
            )
            .section("RECENT EVENTS", event_context)
            .section("FORMAT", format!("- Plain prose, no markdown.\n- {}", language)),
    };
    prompt.render()
}

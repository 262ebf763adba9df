//! Story state threaded through every story graph.
//!
//! One explicit record replaces an ad-hoc key/value map: every field is
//! optional and `None` means "unset". Each node documents the fields it reads
//! and writes (see `story`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::Metadata;

/// Who started the run. Seeds set it and runs carry it through; no node reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cli,
    Api,
}

/// Output language for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// English name of the language, as used in prompts.
    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "French",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "fr" | "french" | "francais" | "français" => Ok(Self::Fr),
            _ => Err(format!("unknown language: {} (use en or fr)", s)),
        }
    }
}

/// Which generation produced `generated`; picks the save collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStep {
    WorldCreation,
    LoreGeneration,
    CharacterCreation,
    EventRecording,
}

/// One document produced by a generation node, not yet saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Shared story state. All fields optional; `Default` is the empty state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryState {
    pub source: Option<Source>,
    pub language: Option<Language>,

    // Initialisation
    pub create_new_world: Option<bool>,
    pub must_restart_init: Option<bool>,
    pub user_input: Option<String>,

    // World
    pub world_id: Option<String>,
    pub world_name: Option<String>,
    pub world_genre: Option<String>,
    pub story_directives: Option<String>,
    pub generated: Option<Vec<GeneratedDocument>>,
    pub active_step: Option<ActiveStep>,

    // Retrieved context
    pub world_context: Option<String>,
    pub lore_context: Option<String>,
    pub character_context: Option<String>,
    pub event_context: Option<String>,

    // Character
    pub create_new_character: Option<bool>,
    pub character_id: Option<String>,
    pub character_name: Option<String>,
    pub character_gender: Option<String>,
    pub character_description: Option<String>,
    pub must_restart_character: Option<bool>,

    // Gameplay
    pub world_summary: Option<String>,
    pub ai_question: Option<String>,
    pub player_answer: Option<String>,
    pub immediate_events: Option<String>,

    // Question loop
    pub question_index: Option<usize>,
    pub current_question: Option<String>,
    pub responses: Option<BTreeMap<String, String>>,
}

impl StoryState {
    /// Language to write in; English when unset.
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    /// `Some(value)` only for a non-blank string field.
    pub fn non_blank(field: &Option<String>) -> Option<&str> {
        field.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

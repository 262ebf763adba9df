//! Keyed question loop: `ask_question` → `collect_answer` until done.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::interaction::Interaction;
use crate::state::StoryState;

/// One question; its answer is stored under `key` in `responses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub key: String,
    pub text: String,
}

impl Question {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

pub fn world_building_questions() -> Vec<Question> {
    vec![
        Question::new("world_name", "What would you like to name your world?"),
        Question::new(
            "world_genre",
            "Describe the world's main genre: hopeful or grim, ancient or futuristic, magical or technological?",
        ),
        Question::new(
            "story_directives",
            "Are there particular themes or narrative threads you'd like to explore?",
        ),
    ]
}

pub fn character_creation_questions() -> Vec<Question> {
    vec![
        Question::new("character_name", "What is the name of your character?"),
        Question::new("character_gender", "What is your character's gender?"),
        Question::new(
            "character_description",
            "Describe your character in a few words: origin, trade, temperament.",
        ),
    ]
}

fn current<'a>(questions: &'a [Question], state: &StoryState) -> Result<&'a Question, AgentError> {
    let index = state.question_index.unwrap_or(0);
    questions.get(index).ok_or_else(|| {
        AgentError::ExecutionFailed(format!(
            "question index {} out of range ({} questions)",
            index,
            questions.len()
        ))
    })
}

/// Puts the question at `question_index` (default 0) into `current_question`.
pub struct AskQuestionNode {
    questions: Arc<Vec<Question>>,
}

impl AskQuestionNode {
    pub fn new(questions: Arc<Vec<Question>>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl Node<StoryState> for AskQuestionNode {
    fn id(&self) -> &str {
        "ask_question"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let question = current(&self.questions, &state)?;
        state.current_question = Some(question.text.clone());
        state.question_index = Some(state.question_index.unwrap_or(0));
        Ok(state)
    }
}

/// Asks `current_question`, stores the answer under the question's key and
/// advances `question_index`.
pub struct CollectAnswerNode {
    questions: Arc<Vec<Question>>,
    interaction: Arc<dyn Interaction>,
}

impl CollectAnswerNode {
    pub fn new(questions: Arc<Vec<Question>>, interaction: Arc<dyn Interaction>) -> Self {
        Self {
            questions,
            interaction,
        }
    }
}

#[async_trait]
impl Node<StoryState> for CollectAnswerNode {
    fn id(&self) -> &str {
        "collect_answer"
    }

    async fn run(&self, mut state: StoryState) -> Result<StoryState, AgentError> {
        let question = current(&self.questions, &state)?;
        let cue = state.current_question.take().unwrap_or_else(|| question.text.clone());
        let answer = self.interaction.ask(&cue).await?;
        state
            .responses
            .get_or_insert_with(Default::default)
            .insert(question.key.clone(), answer.trim().to_string());
        state.question_index = Some(state.question_index.unwrap_or(0) + 1);
        Ok(state)
    }
}

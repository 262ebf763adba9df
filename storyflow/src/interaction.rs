//! Question/answer seam for nodes that collect player input.
//!
//! `StdioInteraction` prints cues to stdout and reads answers from stdin;
//! `ScriptedInteraction` replays queued answers and records everything said.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::error::AgentError;

/// Asks the player something and returns the raw answer.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Shows `cue` and waits for one answer line (without the newline).
    async fn ask(&self, cue: &str) -> Result<String, AgentError>;

    /// Shows `text` without waiting for an answer.
    async fn say(&self, text: &str) -> Result<(), AgentError>;
}

/// Terminal interaction: `AI: <cue>` then an `Answer: ` prompt.
pub struct StdioInteraction {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for StdioInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioInteraction {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn write(&self, text: &str) -> Result<(), AgentError> {
        let mut out = tokio::io::stdout();
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("stdout: {}", e)))?;
        out.flush()
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("stdout: {}", e)))
    }
}

#[async_trait]
impl Interaction for StdioInteraction {
    async fn ask(&self, cue: &str) -> Result<String, AgentError> {
        self.write(&format!("\nAI: {}\nAnswer: ", cue)).await?;
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(AgentError::ExecutionFailed("stdin closed".into())),
            Err(e) => Err(AgentError::ExecutionFailed(format!("stdin: {}", e))),
        }
    }

    async fn say(&self, text: &str) -> Result<(), AgentError> {
        self.write(&format!("\nAI: {}\n", text)).await
    }
}

/// What a `ScriptedInteraction` saw: cues asked and texts said, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    Asked(String),
    Said(String),
}

/// Replays queued answers; running out of answers is an execution error.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: Mutex<VecDeque<String>>,
    transcript: Mutex<Vec<Utterance>>,
}

impl ScriptedInteraction {
    pub fn new<I, T>(answers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    pub fn transcript(&self) -> Vec<Utterance> {
        self.transcript.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Texts passed to `say`, in order.
    pub fn said(&self) -> Vec<String> {
        self.transcript()
            .into_iter()
            .filter_map(|u| match u {
                Utterance::Said(s) => Some(s),
                Utterance::Asked(_) => None,
            })
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn record(&self, utterance: Utterance) {
        if let Ok(mut t) = self.transcript.lock() {
            t.push(utterance);
        }
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn ask(&self, cue: &str) -> Result<String, AgentError> {
        self.record(Utterance::Asked(cue.to_string()));
        self.answers
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("script poisoned".into()))?
            .pop_front()
            .ok_or_else(|| AgentError::ExecutionFailed(format!("no scripted answer for: {}", cue)))
    }

    async fn say(&self, text: &str) -> Result<(), AgentError> {
        self.record(Utterance::Said(text.to_string()));
        Ok(())
    }
}

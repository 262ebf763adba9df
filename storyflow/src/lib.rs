//! # storyflow
//!
//! Stateful narrative pipelines with a **state-in, state-out** design: one
//! shared `StoryState` flows through named nodes wired into a directed graph
//! with conditional branching, loop-back edges and a hard recursion limit.
//! Prompts are fitted into a token budget before every model call.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Router`, `END`
//!   build, validate and run graphs over any state type.
//! - [`truncation`]: `PromptTruncator`, `compute_limits` and section-aware
//!   truncation of `## `-headed prompts.
//! - [`story`]: the node catalog (questions, existence checks, context
//!   retrieval, generation, persistence) and routers.
//! - [`workflows`]: per-operation graph assemblies over a `Services` bundle.
//! - [`llm`], [`store`], [`interaction`]: collaborator seams with in-memory
//!   and scripted implementations for tests.
//!
//! ## Features
//!
//! - `tracing` (default): structured logs for graph runs and truncation.
//! - `tiktoken` (default): `TiktokenTokenizer` BPE token counting.
//! - `openai`: `ChatOpenAI` via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storyflow::{AgentError, FnNode, StateGraph, END};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = StateGraph::<i32>::new();
//! graph.add_node("inc", Arc::new(FnNode::new("inc", |n: i32| async move {
//!     Ok::<_, AgentError>(n + 1)
//! })))?;
//! graph.set_entry("inc")?;
//! graph.add_edge("inc", END)?;
//! let compiled = graph.compile()?;
//! assert_eq!(compiled.invoke(1, 10).await?, 2);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod interaction;
pub mod llm;
pub mod state;
pub mod store;
pub mod story;
pub mod stream;
pub mod truncation;
pub mod workflows;

pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, ExecutionTrace, FnNode, GraphError, Node,
    NodeMiddleware, Router, StateGraph, END,
};
pub use interaction::{Interaction, ScriptedInteraction, StdioInteraction};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use llm::{LlmClient, MockLlm};
pub use state::{ActiveStep, GeneratedDocument, Language, Source, StoryState};
pub use store::{
    Document, DocumentStore, Embedder, HashingEmbedder, InMemoryDocumentStore, StoreError,
};
pub use stream::{StreamEvent, StreamMode};
#[cfg(feature = "tiktoken")]
pub use truncation::TiktokenTokenizer;
pub use truncation::{
    CharTokenizer, Limits, PromptTruncator, Tokenizer, TruncationConfig, TruncationError,
};
pub use workflows::{Operation, Services, WorkflowError};

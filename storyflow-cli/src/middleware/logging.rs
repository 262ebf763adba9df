//! Logging middleware that records node enter/exit around each node run.

use std::time::Instant;

use async_trait::async_trait;
use storyflow::graph::NodeRunner;
use storyflow::{AgentError, NodeMiddleware, StoryState};

/// Middleware that logs node enter/exit (with elapsed time) around each run.
///
/// Logs go through `tracing` to stderr so that story text on stdout can be
/// redirected separately.
pub struct LoggingMiddleware;

#[async_trait]
impl NodeMiddleware<StoryState> for LoggingMiddleware {
    async fn around_run(
        &self,
        node_id: &str,
        state: StoryState,
        inner: NodeRunner<StoryState>,
    ) -> Result<StoryState, AgentError> {
        tracing::debug!(node = node_id, "enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(s) => tracing::debug!(
                node = node_id,
                elapsed_ms,
                active_step = ?s.active_step,
                "exit"
            ),
            Err(e) => tracing::warn!(node = node_id, elapsed_ms, error = %e, "exit with error"),
        }
        result
    }
}

//! Per-run context threaded through the run loop.
//!
//! Holds the optional stream sender plus selected stream modes, and the
//! optional trace being recorded.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::graph::trace::ExecutionTrace;
use crate::stream::{StreamEvent, StreamMode};

pub(crate) struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Optional sender for streaming events.
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    /// Enabled stream modes (Values, Updates).
    pub stream_mode: HashSet<StreamMode>,
    /// Trace being recorded, when the caller asked for one.
    pub trace: Option<ExecutionTrace<S>>,
}

impl<S> RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn plain() -> Self {
        Self {
            stream_tx: None,
            stream_mode: HashSet::new(),
            trace: None,
        }
    }

    pub fn traced() -> Self {
        Self {
            trace: Some(ExecutionTrace::default()),
            ..Self::plain()
        }
    }

    /// Records and emits the state returned by `node_id`.
    pub async fn after_node(&mut self, node_id: &str, state: &S) {
        if let Some(trace) = self.trace.as_mut() {
            trace.record(node_id, state.clone());
        }
        if let Some(tx) = &self.stream_tx {
            if self.stream_mode.contains(&StreamMode::Values) {
                let _ = tx.send(StreamEvent::Values(state.clone())).await;
            }
            if self.stream_mode.contains(&StreamMode::Updates) {
                let _ = tx
                    .send(StreamEvent::Updates {
                        node_id: node_id.to_string(),
                        state: state.clone(),
                    })
                    .await;
            }
        }
    }
}

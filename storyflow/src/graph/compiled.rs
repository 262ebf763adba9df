//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Holds nodes, the entry id and each node's
//! routing. Cheap to clone and safe to share across concurrent invocations:
//! every run owns its own state value.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_route,
};
use super::node_middleware::NodeMiddleware;
use super::run_context::RunContext;
use super::routing::Routing;
use super::trace::ExecutionTrace;
use super::{Node, END};

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the entry node; after each node, follows its direct edge or asks
/// its router for a label. Stops at `END`, on the first node error, or when
/// the recursion limit is reached.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) entry: String,
    pub(super) routes: HashMap<String, Routing<S>>,
    /// Optional node middleware; set with `StateGraph::with_middleware` before compile.
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Entry node id.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Registered node ids, sorted.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs the graph from the entry node with `state`.
    ///
    /// `recursion_limit` is the maximum number of node invocations; attempting
    /// one more fails with `RecursionLimitExceeded`. Node errors and
    /// `UnknownRouteLabel` abort the run and are returned unmodified.
    pub async fn invoke(&self, state: S, recursion_limit: usize) -> Result<S, AgentError> {
        let mut ctx = RunContext::plain();
        self.run(state, recursion_limit, &mut ctx).await
    }

    /// Like `invoke`, also returning the ordered (node id, state) trace of the run.
    pub async fn invoke_with_trace(
        &self,
        state: S,
        recursion_limit: usize,
    ) -> Result<(S, ExecutionTrace<S>), AgentError> {
        let mut ctx = RunContext::traced();
        let state = self.run(state, recursion_limit, &mut ctx).await?;
        Ok((state, ctx.trace.unwrap_or_default()))
    }

    /// Streams graph execution, emitting events via channel-backed Stream.
    ///
    /// A failed run ends the stream with `StreamEvent::Error`.
    pub fn stream(
        &self,
        state: S,
        recursion_limit: usize,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        self.stream_with_result(state, recursion_limit, stream_mode).0
    }

    /// Like `stream`, also returning a handle that resolves to the run's
    /// result, so callers keep the typed `AgentError` of a failed run.
    ///
    /// Drain the stream before awaiting the handle: the run blocks once the
    /// event channel is full.
    pub fn stream_with_result(
        &self,
        state: S,
        recursion_limit: usize,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> (ReceiverStream<StreamEvent<S>>, JoinHandle<Result<S, AgentError>>) {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        let handle = tokio::spawn(async move {
            let mut ctx = RunContext {
                stream_tx: Some(tx.clone()),
                stream_mode: mode_set,
                trace: None,
            };
            let result = graph.run(state, recursion_limit, &mut ctx).await;
            if let Err(e) = &result {
                let _ = tx
                    .send(StreamEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
            result
        });

        (ReceiverStream::new(rx), handle)
    }

    async fn run(
        &self,
        state: S,
        recursion_limit: usize,
        ctx: &mut RunContext<S>,
    ) -> Result<S, AgentError> {
        log_graph_start(&self.entry, recursion_limit);
        let result = self.run_loop(state, recursion_limit, ctx).await;
        if let Err(e) = &result {
            log_graph_error(e);
        }
        result
    }

    async fn run_loop(
        &self,
        mut state: S,
        recursion_limit: usize,
        ctx: &mut RunContext<S>,
    ) -> Result<S, AgentError> {
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        while current != END {
            if steps >= recursion_limit {
                return Err(AgentError::RecursionLimitExceeded {
                    limit: recursion_limit,
                });
            }
            let node = self
                .nodes
                .get(&current)
                .cloned()
                .ok_or_else(|| AgentError::ExecutionFailed(format!("node not found: {}", current)))?;

            log_node_start(&current, steps);
            state = self.run_node(&current, node, state).await?;
            ctx.after_node(&current, &state).await;

            let next = self.next_node(&current, &state)?;
            log_node_complete(&current, &next);
            current = next;
            steps += 1;
        }

        log_graph_complete(steps);
        Ok(state)
    }

    async fn run_node(
        &self,
        node_id: &str,
        node: Arc<dyn Node<S>>,
        state: S,
    ) -> Result<S, AgentError> {
        match &self.middleware {
            Some(middleware) => {
                middleware
                    .around_run(
                        node_id,
                        state,
                        Box::new(move |s| Box::pin(async move { node.run(s).await })),
                    )
                    .await
            }
            None => node.run(state).await,
        }
    }

    fn next_node(&self, current: &str, state: &S) -> Result<String, AgentError> {
        match self.routes.get(current) {
            Some(Routing::Direct(to)) => Ok(to.clone()),
            Some(Routing::Conditional { router, targets }) => {
                let label = router.route(state);
                let target = targets.get(&label);
                log_route(current, &label, target.map(String::as_str));
                target.cloned().ok_or_else(|| AgentError::UnknownRouteLabel {
                    node: current.to_string(),
                    label,
                })
            }
            None => Err(AgentError::ExecutionFailed(format!(
                "node '{}' has no outgoing edge",
                current
            ))),
        }
    }
}

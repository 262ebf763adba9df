//! Middleware wrapped around every node run.
//!
//! Attached with `StateGraph::with_middleware` before `compile`. The compiled
//! graph hands each node invocation to `around_run` as a boxed continuation.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::AgentError;

/// Boxed future returned by the continuation passed to `around_run`.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<S, AgentError>> + Send>>;

/// Continuation that runs the wrapped node with the given state.
pub type NodeRunner<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

/// Wraps each node run (logging, timing, fault injection in tests).
///
/// Implementations must call `inner` at most once and should return its
/// result unchanged unless they deliberately transform it.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunner<S>,
    ) -> Result<S, AgentError>;
}

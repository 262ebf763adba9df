//! Graph node trait: one step in a StateGraph.
//!
//! Receives state `S`, returns the replacement `S`. Used by `StateGraph` and
//! `CompiledStateGraph`. A node may perform side effects (model calls,
//! persistence writes) but communicates with other nodes only through the
//! state it returns.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::AgentError;

/// One step in a graph: state in, state out.
///
/// The engine replaces its state with the returned value and then follows the
/// node's outgoing routing. Nodes must tolerate absent optional fields and must
/// not drop identity fields that were present on entry.
///
/// **Interaction**: Registered with `StateGraph::add_node`; run by `CompiledStateGraph::invoke`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"check_world_exists"`). Used in logs and traces.
    fn id(&self) -> &str;

    /// One step: state in, state out. Errors abort the run unmodified.
    async fn run(&self, state: S) -> Result<S, AgentError>;
}

/// Adapter that turns an async closure into a `Node`.
///
/// ```rust,no_run
/// use storyflow::graph::FnNode;
///
/// let double = FnNode::new("double", |n: i32| async move { Ok(n * 2) });
/// ```
pub struct FnNode<S, F> {
    id: String,
    f: F,
    _state: PhantomData<fn(S) -> S>,
}

impl<S, F> FnNode<S, F> {
    pub fn new<Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(S) -> Fut,
        Fut: Future<Output = Result<S, AgentError>>,
    {
        Self {
            id: id.into(),
            f,
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<S, F>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, AgentError>> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: S) -> Result<S, AgentError> {
        (self.f)(state).await
    }
}

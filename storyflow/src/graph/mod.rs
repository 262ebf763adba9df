//! State graph: nodes, entry, direct and conditional edges; compile and invoke.
//!
//! Build a `StateGraph`, compile it once into a `CompiledStateGraph`, then
//! invoke it any number of times (concurrently if needed) with a state value
//! and a recursion limit.

mod compile_error;
mod compiled;
mod logging;
mod node;
mod node_middleware;
mod router;
mod routing;
mod run_context;
mod state_graph;
mod trace;

pub use compile_error::{CompilationError, GraphError, GraphViolation};
pub use compiled::CompiledStateGraph;
pub use node::{FnNode, Node};
pub use node_middleware::{NodeFuture, NodeMiddleware, NodeRunner};
pub use router::Router;
pub use routing::Routing;
pub use state_graph::{StateGraph, END};
pub use trace::{ExecutionTrace, TraceStep};

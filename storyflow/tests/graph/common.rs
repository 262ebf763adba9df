//! Shared node helpers for graph integration tests.

use std::sync::Arc;

use serde_json::{json, Value};
use storyflow::{AgentError, FnNode, Node};

/// Node that appends its id to the `visited` array of a JSON object state.
pub fn visit(id: &'static str) -> Arc<dyn Node<Value>> {
    Arc::new(FnNode::new(id, move |mut state: Value| async move {
        match state.get_mut("visited").and_then(Value::as_array_mut) {
            Some(list) => list.push(json!(id)),
            None => state["visited"] = json!([id]),
        }
        Ok::<_, AgentError>(state)
    }))
}

/// Node that adds one to an integer state.
pub fn inc(id: &'static str) -> Arc<dyn Node<i32>> {
    Arc::new(FnNode::new(id, |n: i32| async move { Ok(n + 1) }))
}

/// Ids recorded by `visit`, in order.
pub fn visited(state: &Value) -> Vec<String> {
    state["visited"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

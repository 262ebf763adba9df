//! invoke output, recursion limit and traces.

use serde_json::{json, Value};
use storyflow::{AgentError, StateGraph, END};

use crate::common::{inc, visit, visited};

fn linear() -> StateGraph<i32> {
    let mut graph = StateGraph::<i32>::new();
    for id in ["a", "b", "c"] {
        graph.add_node(id, inc(id)).unwrap();
    }
    graph.set_entry("a").unwrap();
    graph.add_edge("a", "b").unwrap();
    graph.add_edge("b", "c").unwrap();
    graph.add_edge("c", END).unwrap();
    graph
}

/// **Scenario**: A linear graph runs every node once and returns the last state.
#[tokio::test]
async fn linear_graph_runs_each_node_once() {
    let compiled = linear().compile().unwrap();
    assert_eq!(compiled.invoke(0, 10).await.unwrap(), 3);
}

/// **Scenario**: recursion_limit equal to the path length succeeds; one less fails.
#[tokio::test]
async fn recursion_limit_counts_node_invocations() {
    let compiled = linear().compile().unwrap();
    assert_eq!(compiled.invoke(0, 3).await.unwrap(), 3);
    match compiled.invoke(0, 2).await {
        Err(AgentError::RecursionLimitExceeded { limit }) => assert_eq!(limit, 2),
        other => panic!("expected RecursionLimitExceeded, got {:?}", other),
    }
}

/// **Scenario**: The trace lists visited node ids with the state after each.
#[tokio::test]
async fn invoke_with_trace_records_each_step() {
    let compiled = linear().compile().unwrap();
    let (state, trace) = compiled.invoke_with_trace(10, 10).await.unwrap();
    assert_eq!(state, 13);
    assert_eq!(trace.node_ids(), vec!["a", "b", "c"]);
    assert_eq!(trace.last_state(), Some(&13));
}

/// **Scenario**: Node errors propagate out of invoke unmodified and stop the run.
#[tokio::test]
async fn node_error_propagates_unmodified() {
    let mut graph = StateGraph::<Value>::new();
    graph.add_node("first", visit("first")).unwrap();
    graph
        .add_node(
            "boom",
            std::sync::Arc::new(storyflow::FnNode::new("boom", |_s: Value| async move {
                Err(AgentError::EntityMissing {
                    kind: "world".into(),
                    name: "eldoria".into(),
                })
            })),
        )
        .unwrap();
    graph.add_node("never", visit("never")).unwrap();
    graph.set_entry("first").unwrap();
    graph.add_edge("first", "boom").unwrap();
    graph.add_edge("boom", "never").unwrap();
    graph.add_edge("never", END).unwrap();

    let err = graph.compile().unwrap().invoke(json!({}), 10).await.unwrap_err();
    match err {
        AgentError::EntityMissing { kind, name } => {
            assert_eq!(kind, "world");
            assert_eq!(name, "eldoria");
        }
        other => panic!("expected EntityMissing, got {:?}", other),
    }
}

/// **Scenario**: One compiled graph serves concurrent invocations independently.
#[tokio::test]
async fn concurrent_invocations_share_compiled_graph() {
    let compiled = linear().compile().unwrap();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let g = compiled.clone();
            tokio::spawn(async move { g.invoke(i * 100, 10).await })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.await.unwrap().unwrap(), i as i32 * 100 + 3);
    }
}

/// **Scenario**: A JSON state keeps writes from every visited node in visit order.
#[tokio::test]
async fn json_state_accumulates_writes() {
    let mut graph = StateGraph::<Value>::new();
    graph.add_node("one", visit("one")).unwrap();
    graph.add_node("two", visit("two")).unwrap();
    graph.set_entry("one").unwrap();
    graph.add_edge("one", "two").unwrap();
    graph.add_edge("two", END).unwrap();
    let out = graph.compile().unwrap().invoke(json!({"seed": 1}), 5).await.unwrap();
    assert_eq!(visited(&out), vec!["one", "two"]);
    assert_eq!(out["seed"], 1);
}

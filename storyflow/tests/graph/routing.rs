//! Conditional edges, loop-back cycles and unmapped labels.

use std::sync::Arc;

use serde_json::{json, Value};
use storyflow::{AgentError, FnNode, StateGraph, StreamEvent, StreamMode, END};
use tokio_stream::StreamExt;

use crate::common::{visit, visited};

fn flag_router(state: &Value) -> String {
    let label = if state["flag"] == json!(true) { "yes" } else { "no" };
    label.to_string()
}

fn flag_graph() -> StateGraph<Value> {
    let mut graph = StateGraph::<Value>::new();
    graph.add_node("start", visit("start")).unwrap();
    graph.add_node("yes_branch", visit("yes_branch")).unwrap();
    graph.add_node("no_branch", visit("no_branch")).unwrap();
    graph.set_entry("start").unwrap();
    graph
        .add_conditional_edges(
            "start",
            flag_router,
            [("yes", "yes_branch"), ("no", "no_branch")],
        )
        .unwrap();
    graph.add_edge("yes_branch", END).unwrap();
    graph.add_edge("no_branch", END).unwrap();
    graph
}

/// **Scenario**: {"flag": true} follows the "yes" edge; the final state holds every visited node's write.
#[tokio::test]
async fn router_label_selects_mapped_edge() {
    let compiled = flag_graph().compile().unwrap();
    let out = compiled.invoke(json!({"flag": true}), 10).await.unwrap();
    assert_eq!(visited(&out), vec!["start", "yes_branch"]);

    let out = compiled.invoke(json!({"flag": false}), 10).await.unwrap();
    assert_eq!(visited(&out), vec!["start", "no_branch"]);
}

/// **Scenario**: A cycle whose router never exits fails on the 6th invocation with limit 5.
#[tokio::test]
async fn cycle_without_exit_hits_recursion_limit() {
    let mut graph = StateGraph::<Value>::new();
    graph.add_node("loop", visit("loop")).unwrap();
    graph.set_entry("loop").unwrap();
    graph
        .add_conditional_edges(
            "loop",
            |_: &Value| "again".to_string(),
            [("again", "loop"), ("done", END)],
        )
        .unwrap();
    let compiled = graph.compile().unwrap();

    match compiled.invoke(json!({}), 5).await {
        Err(AgentError::RecursionLimitExceeded { limit }) => assert_eq!(limit, 5),
        other => panic!("expected RecursionLimitExceeded, got {:?}", other),
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let counted = Arc::new(FnNode::new("count", move |n: i32| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(());
            Ok(n + 1)
        }
    }));
    let mut graph = StateGraph::<i32>::new();
    graph.add_node("count", counted).unwrap();
    graph.set_entry("count").unwrap();
    graph
        .add_conditional_edges("count", |_: &i32| "again".to_string(), [("again", "count")])
        .unwrap();
    let result = graph.compile().unwrap().invoke(0, 5).await;
    assert!(matches!(result, Err(AgentError::RecursionLimitExceeded { .. })));
    assert_eq!(rx.try_iter().count(), 5);
}

/// **Scenario**: A loop that exits once a counter is reached terminates normally.
#[tokio::test]
async fn loop_back_until_condition() {
    let mut graph = StateGraph::<i32>::new();
    graph
        .add_node("step", Arc::new(FnNode::new("step", |n: i32| async move { Ok(n + 1) })))
        .unwrap();
    graph.set_entry("step").unwrap();
    graph
        .add_conditional_edges(
            "step",
            |n: &i32| if *n < 4 { "more".to_string() } else { "stop".to_string() },
            [("more", "step"), ("stop", END)],
        )
        .unwrap();
    assert_eq!(graph.compile().unwrap().invoke(0, 10).await.unwrap(), 4);
}

/// **Scenario**: An unmapped router label is a configuration error naming node and label.
#[tokio::test]
async fn unmapped_label_fails() {
    let mut graph = StateGraph::<Value>::new();
    graph.add_node("start", visit("start")).unwrap();
    graph.set_entry("start").unwrap();
    graph
        .add_conditional_edges("start", |_: &Value| "maybe".to_string(), [("yes", END)])
        .unwrap();
    let err = graph.compile().unwrap().invoke(json!({}), 5).await.unwrap_err();
    assert!(err.is_configuration());
    match err {
        AgentError::UnknownRouteLabel { node, label } => {
            assert_eq!(node, "start");
            assert_eq!(label, "maybe");
        }
        other => panic!("expected UnknownRouteLabel, got {:?}", other),
    }
}

/// **Scenario**: Streaming a conditional run emits one update per visited node.
#[tokio::test]
async fn stream_follows_routing() {
    let compiled = flag_graph().compile().unwrap();
    let events: Vec<StreamEvent<Value>> = compiled
        .stream(json!({"flag": true}), 10, [StreamMode::Updates])
        .collect()
        .await;
    let nodes: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(nodes, vec!["start", "yes_branch"]);
}

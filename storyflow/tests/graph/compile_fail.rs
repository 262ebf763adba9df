//! StateGraph registration and compile failure cases.

use storyflow::graph::GraphViolation;
use storyflow::{GraphError, StateGraph, END};

use crate::common::inc;

/// **Scenario**: A node reachable from the entry with no outgoing routing fails compile.
#[test]
fn compile_fails_when_node_has_no_outgoing_route() {
    let mut graph = StateGraph::<i32>::new();
    graph.add_node("a", inc("a")).unwrap();
    graph.add_node("b", inc("b")).unwrap();
    graph.set_entry("a").unwrap();
    graph.add_edge("a", "b").unwrap();

    let err = graph.compile().err().expect("compile should fail");
    assert_eq!(
        err.violations,
        vec![GraphViolation::NoOutgoingRoute("b".into())]
    );
}

/// **Scenario**: A graph without an entry and a graph with an orphan node both fail compile.
#[test]
fn compile_reports_missing_entry_and_unreachable_nodes() {
    let mut graph = StateGraph::<i32>::new();
    graph.add_node("a", inc("a")).unwrap();
    graph.add_edge("a", END).unwrap();

    let err = graph.compile().err().expect("compile should fail");
    assert!(err.contains(&GraphViolation::MissingEntry));

    let mut graph = StateGraph::<i32>::new();
    graph.add_node("a", inc("a")).unwrap();
    graph.add_node("orphan", inc("orphan")).unwrap();
    graph.set_entry("a").unwrap();
    graph.add_edge("a", END).unwrap();
    let err = graph.compile().err().expect("compile should fail");
    assert_eq!(
        err.violations,
        vec![GraphViolation::Unreachable("orphan".into())]
    );
    assert!(err.to_string().contains("orphan"));
}

/// **Scenario**: Edges to unknown nodes, duplicate edges and duplicate nodes are rejected eagerly.
#[test]
fn registration_errors_are_eager() {
    let mut graph = StateGraph::<i32>::new();
    graph.add_node("a", inc("a")).unwrap();
    assert_eq!(
        graph.add_edge("a", "missing").err(),
        Some(GraphError::UnknownNode("missing".into()))
    );
    graph.add_edge("a", END).unwrap();
    assert_eq!(
        graph.add_edge("a", END).err(),
        Some(GraphError::DuplicateEdge("a".into()))
    );
    assert_eq!(
        graph.add_node("a", inc("a")).err(),
        Some(GraphError::DuplicateNode("a".into()))
    );
}

/// **Scenario**: entry → A → (router: "x"→B, "y"→END), B → END compiles.
#[test]
fn fully_wired_conditional_graph_compiles() {
    let mut graph = StateGraph::<i32>::new();
    graph.add_node("a", inc("a")).unwrap();
    graph.add_node("b", inc("b")).unwrap();
    graph.set_entry("a").unwrap();
    graph
        .add_conditional_edges(
            "a",
            |n: &i32| if *n > 0 { "x".to_string() } else { "y".to_string() },
            [("x", "b"), ("y", END)],
        )
        .unwrap();
    graph.add_edge("b", END).unwrap();
    let compiled = graph.compile().expect("compile");
    assert_eq!(compiled.entry(), "a");
    assert_eq!(compiled.node_ids(), vec!["a", "b"]);
}

//! Common test utilities for building flow definitions and sample sources.
use flowdef::prelude::*;

/// Creates a simple, valid linear `FlowDefinition` for basic tests.
///
/// Graph: `start -> middle -> finish`
#[allow(dead_code)]
pub fn create_linear_flow() -> FlowDefinition {
    FlowDefinition {
        id: "test-flow".to_string(),
        title: "Test Flow".to_string(),
        description: None,
        start_node_id: "start".to_string(),
        nodes: vec![
            NodeDefinition {
                id: "start".to_string(),
                title: "Start".to_string(),
                content: None,
                outlets: Some(vec![OutletDefinition {
                    id: "start-middle-0".to_string(),
                    to: "middle".to_string(),
                    label: None,
                    condition: None,
                }]),
                actions: None,
                auto_advance: None,
            },
            NodeDefinition {
                id: "middle".to_string(),
                title: "Middle".to_string(),
                content: None,
                outlets: Some(vec![OutletDefinition {
                    id: "middle-finish-0".to_string(),
                    to: "finish".to_string(),
                    label: None,
                    condition: None,
                }]),
                actions: None,
                auto_advance: None,
            },
            NodeDefinition {
                id: "finish".to_string(),
                title: "Finish".to_string(),
                content: None,
                outlets: None,
                actions: None,
                auto_advance: None,
            },
        ],
        global_state: None,
        metadata: None,
    }
}

/// A flow with one binary decision: `check` branches to `ok` / `fail`.
#[allow(dead_code)]
pub fn create_decision_flow() -> FlowDefinition {
    FlowDefinition {
        id: "decision-flow".to_string(),
        title: "Decision Flow".to_string(),
        description: None,
        start_node_id: "check".to_string(),
        nodes: vec![
            NodeDefinition {
                id: "check".to_string(),
                title: "Is it valid?".to_string(),
                content: None,
                outlets: Some(vec![
                    OutletDefinition {
                        id: "check-ok-0".to_string(),
                        to: "ok".to_string(),
                        label: Some("Yes".to_string()),
                        condition: None,
                    },
                    OutletDefinition {
                        id: "check-fail-1".to_string(),
                        to: "fail".to_string(),
                        label: Some("No".to_string()),
                        condition: None,
                    },
                ]),
                actions: None,
                auto_advance: None,
            },
            NodeDefinition {
                id: "ok".to_string(),
                title: "Accepted".to_string(),
                content: None,
                outlets: None,
                actions: None,
                auto_advance: None,
            },
            NodeDefinition {
                id: "fail".to_string(),
                title: "Rejected".to_string(),
                content: None,
                outlets: None,
                actions: None,
                auto_advance: None,
            },
        ],
        global_state: None,
        metadata: None,
    }
}

#[allow(dead_code)]
pub const SAMPLE_DOT: &str =
    "digraph G { A [label=\"Start\"]; A -> B [label=\"Next\"]; B [label=\"End\"]; }";

#[allow(dead_code)]
pub const SAMPLE_MERMAID: &str =
    "flowchart TD\nA[Start] --> B{Is it?}\nB -->|Yes| C[OK]\nB -->|No| D[End]";

#[allow(dead_code)]
pub const SAMPLE_PLANTUML: &str = "@startuml\nstart\n:A;\nstop\n@enduml";

#[allow(dead_code)]
pub const SAMPLE_JSON: &str = r#"{
  "id": "sample",
  "title": "Sample",
  "startNodeId": "a",
  "nodes": [
    { "id": "a", "title": "A", "outlets": [{ "id": "a-b-0", "to": "b" }] },
    { "id": "b", "title": "B" }
  ]
}"#;

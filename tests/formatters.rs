//! Tests for the lossy formatters: every emitted document must be
//! re-parseable by its own format into an equivalent graph.
mod common;
use common::*;
use flowdef::prelude::*;

// ─── DOT ─────────────────────────────────────────────────────────────────────

#[test]
fn test_dot_output_shape() {
    let output = DotFormat::new().format(&create_linear_flow()).unwrap();
    assert!(output.starts_with("digraph flow {"));
    assert!(output.contains("label=\"Test Flow\";"));
    assert!(output.contains("start [label=\"Start\"];"));
    assert!(output.contains("start -> middle;"));
    assert!(output.contains("middle -> finish;"));
    assert!(output.trim_end().ends_with('}'));
}

#[test]
fn test_dot_round_trip() {
    let format = DotFormat::new();
    let output = format.format(&create_decision_flow()).unwrap();
    let reparsed = format.parse(&output).expect("own output reparses").flow;

    assert_eq!(reparsed.title, "Decision Flow");
    assert_eq!(reparsed.start_node_id, "check");
    let check = reparsed.node("check").unwrap();
    assert_eq!(check.outlet_to("ok").unwrap().label.as_deref(), Some("Yes"));
    assert_eq!(check.outlet_to("fail").unwrap().label.as_deref(), Some("No"));
}

#[test]
fn test_dot_escapes_quotes_and_newlines() {
    let mut flow = create_linear_flow();
    flow.nodes[0].title = "Say \"hi\"\nthen wave".to_string();
    let output = DotFormat::new().format(&flow).unwrap();
    assert!(output.contains(r#"[label="Say \"hi\"\nthen wave"]"#));
}

#[test]
fn test_dot_missing_start_node_is_an_error() {
    let mut flow = create_linear_flow();
    flow.start_node_id = "ghost".to_string();
    let err = DotFormat::new().format(&flow).unwrap_err();
    assert!(matches!(err, FormatError::StartNodeNotFound(_)));
}

// ─── Mermaid ─────────────────────────────────────────────────────────────────

#[test]
fn test_mermaid_output_shape() {
    let output = MermaidFormat::new().format(&create_decision_flow()).unwrap();
    assert!(output.starts_with("---\ntitle: Decision Flow\n---\nflowchart TD\n"));
    // Two outlets make a diamond; terminals stay rectangles.
    assert!(output.contains("check{\"Is it valid?\"}"));
    assert!(output.contains("ok[\"Accepted\"]"));
    assert!(output.contains("check -->|Yes| ok"));
    assert!(output.contains("check -->|No| fail"));
}

#[test]
fn test_mermaid_round_trip() {
    let format = MermaidFormat::new();
    let output = format.format(&create_decision_flow()).unwrap();
    let reparsed = format.parse(&output).expect("own output reparses").flow;

    assert_eq!(reparsed.title, "Decision Flow");
    assert_eq!(reparsed.start_node_id, "check");
    assert_eq!(reparsed.node("check").unwrap().title, "Is it valid?");
    let check = reparsed.node("check").unwrap();
    assert_eq!(check.outlet_to("ok").unwrap().label.as_deref(), Some("Yes"));
    assert_eq!(check.outlet_to("fail").unwrap().label.as_deref(), Some("No"));
}

#[test]
fn test_mermaid_newlines_become_br_tags() {
    let mut flow = create_linear_flow();
    flow.nodes[0].content = Some("First\nSecond".to_string());
    let output = MermaidFormat::new().format(&flow).unwrap();
    assert!(output.contains("start[\"First<br>Second\"]"));
}

#[test]
fn test_mermaid_empty_flow_is_just_the_header() {
    let flow = FlowDefinition {
        id: "empty".to_string(),
        ..Default::default()
    };
    let output = MermaidFormat::new().format(&flow).unwrap();
    assert_eq!(output, "flowchart TD\n");
}

#[test]
fn test_mermaid_execution_highlights() {
    let highlights = ExecutionHighlights {
        traversed_nodes: vec!["check".to_string(), "ok".to_string()],
        traversed_edges: vec![("check".to_string(), "ok".to_string())],
    };
    let output = MermaidFormat::new()
        .format_with_highlights(&create_decision_flow(), &highlights)
        .unwrap();

    // Traversed edge is thick, untraversed edge stays plain.
    assert!(output.contains("check ==>|Yes| ok"));
    assert!(output.contains("check -->|No| fail"));
    assert!(output.contains("classDef traversed"));
    assert!(output.contains("class check,ok traversed"));
}

#[test]
fn test_mermaid_highlights_skip_styling_when_nothing_matches() {
    let output = MermaidFormat::new()
        .format_with_highlights(&create_decision_flow(), &ExecutionHighlights::default())
        .unwrap();
    assert!(!output.contains("classDef"));
    assert!(!output.contains("==>"));
}

// ─── PlantUML ────────────────────────────────────────────────────────────────

#[test]
fn test_plantuml_output_shape() {
    let output = PlantUmlFormat::new().format(&create_decision_flow()).unwrap();
    assert!(output.starts_with("@startuml\n"));
    assert!(output.contains("title Decision Flow\n"));
    assert!(output.contains("if (Is it valid?) then (Yes)\n"));
    assert!(output.contains(":Accepted;\n"));
    assert!(output.contains("else (No)\n"));
    assert!(output.contains(":Rejected;\n"));
    assert!(output.contains("endif\n"));
    assert!(output.ends_with("@enduml\n"));
}

#[test]
fn test_plantuml_round_trip() {
    let format = PlantUmlFormat::new();
    let output = format.format(&create_decision_flow()).unwrap();
    let reparsed = format.parse(&output).expect("own output reparses").flow;

    let decision = reparsed
        .nodes
        .iter()
        .find(|n| n.title == "Is it valid?")
        .expect("decision survives");
    assert_eq!(decision.outlets().len(), 2);
    let labels: Vec<_> = decision
        .outlets()
        .iter()
        .map(|o| o.label.as_deref().unwrap())
        .collect();
    assert_eq!(labels, ["Yes", "No"]);
}

#[test]
fn test_plantuml_reconvergence_uses_label_and_goto() {
    // a branches to b/c, both of which rejoin at d.
    let flow = FlowDefinition {
        id: "diamond".to_string(),
        start_node_id: "a".to_string(),
        nodes: vec![
            NodeDefinition {
                id: "a".to_string(),
                title: "Pick".to_string(),
                outlets: Some(vec![
                    OutletDefinition {
                        id: "a-b-0".to_string(),
                        to: "b".to_string(),
                        label: Some("left".to_string()),
                        ..Default::default()
                    },
                    OutletDefinition {
                        id: "a-c-1".to_string(),
                        to: "c".to_string(),
                        label: Some("right".to_string()),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            },
            NodeDefinition {
                id: "b".to_string(),
                title: "B".to_string(),
                outlets: Some(vec![OutletDefinition {
                    id: "b-d-0".to_string(),
                    to: "d".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            NodeDefinition {
                id: "c".to_string(),
                title: "C".to_string(),
                outlets: Some(vec![OutletDefinition {
                    id: "c-d-0".to_string(),
                    to: "d".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            NodeDefinition {
                id: "d".to_string(),
                title: "D".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let output = PlantUmlFormat::new().format(&flow).unwrap();
    assert!(output.contains("label d\n"));
    assert!(output.contains("goto d\n"));
}

#[test]
fn test_plantuml_end_titled_nodes_collapse_to_stop() {
    let mut flow = create_linear_flow();
    flow.nodes[2].title = "End".to_string();
    let output = PlantUmlFormat::new().format(&flow).unwrap();
    assert!(output.contains("stop\n"));
    assert!(!output.contains(":End;"));
}

#[test]
fn test_plantuml_third_outlet_is_not_modeled() {
    let mut flow = create_decision_flow();
    flow.nodes.push(NodeDefinition {
        id: "extra".to_string(),
        title: "Extra".to_string(),
        ..Default::default()
    });
    flow.nodes[0]
        .outlets
        .as_mut()
        .unwrap()
        .push(OutletDefinition {
            id: "check-extra-2".to_string(),
            to: "extra".to_string(),
            label: Some("Maybe".to_string()),
            ..Default::default()
        });

    let output = PlantUmlFormat::new().format(&flow).unwrap();
    assert!(!output.contains(":Extra;"));
}

#[test]
fn test_plantuml_semicolons_in_activity_text_are_replaced() {
    let mut flow = create_linear_flow();
    flow.nodes[1].title = "Load; then verify".to_string();
    let output = PlantUmlFormat::new().format(&flow).unwrap();
    assert!(output.contains(":Load, then verify;\n"));
}

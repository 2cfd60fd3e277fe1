//! Tests for the PlantUML activity-diagram parser.
mod common;
use common::*;
use flowdef::prelude::*;

fn parse_plantuml(source: &str) -> ParsedFlow {
    PlantUmlFormat::new().parse(source).expect("should parse")
}

#[test]
fn test_linear_diagram() {
    let flow = parse_plantuml(SAMPLE_PLANTUML).flow;
    assert_eq!(flow.start_node_id, "start_1");
    let ids: Vec<&str> = flow.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["start_1", "activity_2", "end_3"]);

    assert_eq!(flow.node("start_1").unwrap().outlets()[0].to, "activity_2");
    assert_eq!(flow.node("activity_2").unwrap().outlets()[0].to, "end_3");
    assert!(flow.node("end_3").unwrap().outlets().is_empty());
}

#[test]
fn test_if_else_branches_and_merge() {
    let source = "@startuml\nstart\nif (Valid?) then (yes)\n:Accept;\nelse (no)\n:Reject;\nendif\n:Log;\nstop\n@enduml";
    let flow = parse_plantuml(source).flow;

    let decision = flow.node("decision_2").unwrap();
    assert_eq!(decision.title, "Valid?");
    assert_eq!(decision.outlets().len(), 2);
    assert_eq!(decision.outlets()[0].to, "activity_3");
    assert_eq!(decision.outlets()[0].label.as_deref(), Some("yes"));
    assert_eq!(decision.outlets()[1].to, "activity_4");
    assert_eq!(decision.outlets()[1].label.as_deref(), Some("no"));

    // Both branches reconverge on the statement after endif.
    assert_eq!(flow.node("activity_3").unwrap().outlets()[0].to, "activity_5");
    assert_eq!(flow.node("activity_4").unwrap().outlets()[0].to, "activity_5");
    assert_eq!(flow.node("activity_5").unwrap().outlets()[0].to, "end_6");
}

#[test]
fn test_if_without_else_routes_no_edge_past_the_block() {
    let source = "@startuml\nstart\nif (Extra step?) then (yes)\n:Extra;\nendif\n:Always;\n@enduml";
    let flow = parse_plantuml(source).flow;

    let decision = flow.node("decision_2").unwrap();
    let no_edge = decision.outlet_to("activity_4").expect("no edge");
    assert_eq!(no_edge.label.as_deref(), Some("no"));
    assert_eq!(flow.node("activity_3").unwrap().outlets()[0].to, "activity_4");
}

#[test]
fn test_elseif_chain() {
    let source = "@startuml\nstart\nif (A?) then (a)\n:One;\nelseif (B?) then (b)\n:Two;\nelse (c)\n:Three;\nendif\n:After;\n@enduml";
    let flow = parse_plantuml(source).flow;

    // First decision: taken branch plus the chained "no" edge into the
    // sibling decision.
    let first = flow.node("decision_2").unwrap();
    assert_eq!(first.title, "A?");
    assert_eq!(first.outlet_to("activity_3").unwrap().label.as_deref(), Some("a"));
    assert_eq!(first.outlet_to("decision_4").unwrap().label.as_deref(), Some("no"));

    let second = flow.node("decision_4").unwrap();
    assert_eq!(second.title, "B?");
    assert_eq!(second.outlet_to("activity_5").unwrap().label.as_deref(), Some("b"));
    assert_eq!(second.outlet_to("activity_6").unwrap().label.as_deref(), Some("c"));

    // All three branch bodies merge into the post-endif activity.
    for id in ["activity_3", "activity_5", "activity_6"] {
        assert_eq!(flow.node(id).unwrap().outlets()[0].to, "activity_7");
    }
}

#[test]
fn test_goto_loop_back_to_label() {
    let source = "@startuml\nstart\nlabel begin\n:Ask;\nif (Retry?) then (yes)\ngoto begin\nendif\n:Done;\nstop\n@enduml";
    let parsed = parse_plantuml(source);
    assert!(parsed.warnings.is_empty());

    let decision = parsed.flow.node("decision_3").unwrap();
    let back = decision.outlet_to("activity_2").expect("loop edge");
    assert_eq!(back.label.as_deref(), Some("yes"));
    let onward = decision.outlet_to("activity_4").expect("fall-through edge");
    assert_eq!(onward.label.as_deref(), Some("no"));
}

#[test]
fn test_unresolved_goto_surfaces_a_warning() {
    let parsed = parse_plantuml("@startuml\nstart\n:A;\ngoto nowhere\n@enduml");
    assert_eq!(parsed.warnings.len(), 1);
    assert!(parsed.warnings[0].contains("nowhere"));
    // The flow itself is still usable.
    assert_eq!(parsed.flow.node_count(), 2);
}

#[test]
fn test_title_directive() {
    let flow = parse_plantuml("@startuml\ntitle Login Flow\nstart\n:A;\n@enduml").flow;
    assert_eq!(flow.title, "Login Flow");
    assert_eq!(flow.metadata.as_ref().unwrap()["originalTitle"], "Login Flow");
}

#[test]
fn test_multiline_activity_is_joined() {
    let flow = parse_plantuml("@startuml\nstart\n:first part\nsecond part;\n@enduml").flow;
    assert_eq!(flow.node("activity_2").unwrap().title, "first part second part");
}

#[test]
fn test_unknown_directives_are_ignored() {
    let flow = parse_plantuml("@startuml\nskinparam monochrome true\nstart\n:A;\n@enduml").flow;
    assert_eq!(flow.node_count(), 2);
}

#[test]
fn test_detection_scores() {
    let format = PlantUmlFormat::new();
    assert!(format.detect(SAMPLE_PLANTUML) >= 0.95);
    // Bare activity syntax without the @startuml wrapper still registers.
    let bare = format.detect("start\n:A;\nstop");
    assert!(bare > 0.0 && bare < 0.95);
    assert_eq!(format.detect(SAMPLE_DOT), 0.0);
    assert_eq!(format.detect(SAMPLE_MERMAID), 0.0);
}

#[test]
fn test_plain_text_is_rejected() {
    let err = PlantUmlFormat::new().parse("just some notes\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::InvalidDocument { format: "plantuml", .. }
    ));
}

#[test]
fn test_metadata_records_format() {
    let flow = parse_plantuml(SAMPLE_PLANTUML).flow;
    assert_eq!(flow.metadata.as_ref().unwrap()["format"], "plantuml");
}

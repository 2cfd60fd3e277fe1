//! PlantUML activity-diagram support. The heavy lifting — turning
//! structured if/elseif/else blocks and goto/label jumps into one flat
//! graph — lives in `state.rs`; this module handles preprocessing, line
//! dispatch, detection, and formatting.

pub mod formatter;
mod state;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use self::state::ParserState;
use super::{FlowFormat, ParsedFlow, split_title_content};
use crate::error::{FormatError, ParseError};
use crate::flow::FlowDefinition;

pub struct PlantUmlFormat;

impl PlantUmlFormat {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlantUmlFormat {
    fn default() -> Self {
        Self::new()
    }
}

static IF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^if\s*\((?<cond>[^)]*)\)\s*then(?:\s*\((?<label>[^)]*)\))?$").unwrap()
});
static ELSEIF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\((?<no>[^)]*)\)\s*)?elseif\s*\((?<cond>[^)]*)\)\s*then(?:\s*\((?<label>[^)]*)\))?$",
    )
    .unwrap()
});
static ELSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^else(?:\s*\((?<label>[^)]*)\))?$").unwrap());
static LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^label\s+(?<name>\S+)$").unwrap());
static GOTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^goto\s+(?<name>\S+)$").unwrap());
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^title\s+(?<text>.+)$").unwrap());

/// Logical lines after directive stripping and multi-line activity
/// reassembly, plus the extracted title.
struct Preprocessed {
    lines: Vec<String>,
    title: Option<String>,
    has_startuml: bool,
}

fn preprocess(source: &str) -> Preprocessed {
    let mut out = Preprocessed {
        lines: Vec::new(),
        title: None,
        has_startuml: false,
    };

    let mut pending_activity: Option<String> = None;
    for raw in source.lines() {
        let line = raw.trim();

        if let Some(partial) = pending_activity.take() {
            if line.starts_with('@') || line.starts_with('\'') {
                // A directive or comment cuts an unterminated activity
                // short; keep the partial and handle the line normally.
                out.lines.push(format!("{};", partial));
            } else {
                // Reassemble an activity spanning several source lines.
                let joined = format!("{} {}", partial, line);
                if line.ends_with(';') {
                    out.lines.push(joined);
                } else {
                    pending_activity = Some(joined);
                }
                continue;
            }
        }

        if line.is_empty() || line.starts_with('\'') {
            continue;
        }
        if line.starts_with("@startuml") {
            out.has_startuml = true;
            continue;
        }
        if line.starts_with("@enduml") {
            continue;
        }
        if let Some(caps) = TITLE.captures(line) {
            out.title = Some(caps["text"].trim().to_string());
            continue;
        }
        if line.starts_with(':') && !line.ends_with(';') {
            pending_activity = Some(line.to_string());
            continue;
        }
        out.lines.push(line.to_string());
    }
    if let Some(partial) = pending_activity {
        // Unterminated trailing activity; keep what we have.
        out.lines.push(format!("{};", partial));
    }
    out
}

impl FlowFormat for PlantUmlFormat {
    fn id(&self) -> &'static str {
        "plantuml"
    }

    fn display_name(&self) -> &'static str {
        "PlantUML Activity Diagram"
    }

    fn detect(&self, source: &str) -> f64 {
        if source.contains("@startuml") {
            return 0.95;
        }
        let has_start = source.lines().any(|l| l.trim() == "start");
        let has_activity = source
            .lines()
            .any(|l| l.trim().starts_with(':') && l.trim().ends_with(';'));
        if has_start && has_activity {
            0.6
        } else {
            0.0
        }
    }

    fn parse(&self, source: &str) -> Result<ParsedFlow, ParseError> {
        let doc = preprocess(source);

        let has_start = doc.lines.iter().any(|l| l == "start");
        if !doc.has_startuml && !has_start {
            return Err(ParseError::InvalidDocument {
                format: "plantuml",
                message: "expected '@startuml' or a 'start' statement".to_string(),
            });
        }

        let mut state = ParserState::new();
        for line in &doc.lines {
            if line == "start" {
                state.on_start();
            } else if line == "stop" || line == "end" {
                state.on_stop();
            } else if line == "endif" {
                state.on_endif();
            } else if let Some(text) = line.strip_prefix(':').and_then(|l| l.strip_suffix(';')) {
                let (title, content) = split_title_content(text.trim());
                state.on_activity(title, content);
            } else if let Some(caps) = IF.captures(line) {
                state.on_if(
                    caps["cond"].trim().to_string(),
                    caps.name("label").map(|m| m.as_str().trim().to_string()),
                );
            } else if let Some(caps) = ELSEIF.captures(line) {
                state.on_elseif(
                    caps["cond"].trim().to_string(),
                    caps.name("label").map(|m| m.as_str().trim().to_string()),
                    caps.name("no").map(|m| m.as_str().trim().to_string()),
                );
            } else if let Some(caps) = ELSE.captures(line) {
                state.on_else(caps.name("label").map(|m| m.as_str().trim().to_string()));
            } else if let Some(caps) = LABEL.captures(line) {
                state.on_label(caps["name"].to_string());
            } else if let Some(caps) = GOTO.captures(line) {
                state.on_goto(caps["name"].to_string());
            }
            // Unrecognized directives (skinparam, notes, ...) are skipped.
        }

        let (nodes, start_node_id, warnings) = state.finish();

        let mut metadata = serde_json::Map::new();
        metadata.insert("format".to_string(), Value::String("plantuml".to_string()));
        if let Some(original) = &doc.title {
            metadata.insert(
                "originalTitle".to_string(),
                Value::String(original.clone()),
            );
        }

        let flow = FlowDefinition {
            id: "plantuml-import".to_string(),
            title: doc.title.unwrap_or_default(),
            description: None,
            start_node_id: start_node_id.unwrap_or_default(),
            nodes,
            global_state: None,
            metadata: Some(metadata),
        };

        flow.validate().map_err(|e| ParseError::InvalidDocument {
            format: "plantuml",
            message: e.to_string(),
        })?;

        Ok(ParsedFlow {
            flow,
            warnings,
        })
    }

    fn format(&self, flow: &FlowDefinition) -> Result<String, FormatError> {
        formatter::format_plantuml(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_strips_directives_and_comments() {
        let doc = preprocess("@startuml\n' comment\nstart\n:A;\nstop\n@enduml\n");
        assert!(doc.has_startuml);
        assert_eq!(doc.lines, ["start", ":A;", "stop"]);
    }

    #[test]
    fn test_preprocess_title() {
        let doc = preprocess("@startuml\ntitle My Diagram\nstart\n@enduml\n");
        assert_eq!(doc.title.as_deref(), Some("My Diagram"));
    }

    #[test]
    fn test_preprocess_reassembles_multiline_activity() {
        let doc = preprocess("@startuml\n:first part\nsecond part;\n@enduml\n");
        assert_eq!(doc.lines, [":first part second part;"]);
    }

    #[test]
    fn test_reassembly_stops_at_directives_and_comments() {
        let doc = preprocess("@startuml\nstart\n:oops\n@enduml\n");
        assert_eq!(doc.lines, ["start", ":oops;"]);

        let doc = preprocess("@startuml\n:first\n' note to self\n:second;\n@enduml\n");
        assert_eq!(doc.lines, [":first;", ":second;"]);
    }

    #[test]
    fn test_missing_start_and_startuml_rejected() {
        let format = PlantUmlFormat::new();
        let err = format.parse(":A;\n:B;\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDocument { .. }));
    }
}

use serde_json::Value;

use super::{FlowFormat, ParsedFlow};
use crate::error::{FormatError, ParseError};
use crate::flow::{FlowDefinition, ValidationReport};

/// The native JSON form of a flow definition — the only lossless format,
/// and the trivial baseline the registry dispatches against.
pub struct JsonFormat;

impl JsonFormat {
    pub fn new() -> Self {
        Self
    }

    /// Field-by-field structural checks on the raw JSON value, so each
    /// violated rule gets its own error instead of a generic serde message.
    fn check_structure(value: &Value) -> Result<(), ParseError> {
        let root = value.as_object().ok_or(ParseError::InvalidFieldType {
            field: "(root)",
            expected: "object",
        })?;

        match root.get("id") {
            None => return Err(ParseError::MissingField("id")),
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(ParseError::InvalidFieldType {
                    field: "id",
                    expected: "string",
                });
            }
        }

        let nodes = match root.get("nodes") {
            None => return Err(ParseError::MissingField("nodes")),
            Some(Value::Array(nodes)) => nodes,
            Some(_) => {
                return Err(ParseError::InvalidFieldType {
                    field: "nodes",
                    expected: "array",
                });
            }
        };

        for (index, node) in nodes.iter().enumerate() {
            let has_id = node
                .as_object()
                .and_then(|n| n.get("id"))
                .map(Value::is_string)
                .unwrap_or(false);
            if !has_id {
                return Err(ParseError::NodeMissingId { index });
            }
        }

        let start = match root.get("startNodeId") {
            None => return Err(ParseError::MissingField("startNodeId")),
            Some(Value::String(start)) => start,
            Some(_) => {
                return Err(ParseError::InvalidFieldType {
                    field: "startNodeId",
                    expected: "string",
                });
            }
        };

        if !start.is_empty() {
            let found = nodes
                .iter()
                .any(|n| n.get("id").and_then(Value::as_str) == Some(start));
            if !found {
                return Err(ParseError::StartNodeNotFound(start.clone()));
            }
        } else if !nodes.is_empty() {
            return Err(ParseError::StartNodeNotFound(String::new()));
        }

        Ok(())
    }
}

impl FlowFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Flow JSON"
    }

    fn detect(&self, source: &str) -> f64 {
        let trimmed = source.trim();
        if !trimmed.starts_with('{') {
            return 0.0;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(root)) => {
                if root.contains_key("nodes") && root.contains_key("startNodeId") {
                    0.95
                } else {
                    // Some JSON, but not obviously a flow document.
                    0.3
                }
            }
            _ => 0.1,
        }
    }

    fn parse(&self, source: &str) -> Result<ParsedFlow, ParseError> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| ParseError::Json(e.to_string()))?;
        Self::check_structure(&value)?;

        let mut flow: FlowDefinition =
            serde_json::from_value(value).map_err(|e| ParseError::Json(e.to_string()))?;

        flow.metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert("format".to_string(), Value::String("json".to_string()));

        flow.validate().map_err(|e| ParseError::InvalidDocument {
            format: "json",
            message: e.to_string(),
        })?;

        Ok(ParsedFlow::new(flow))
    }

    fn format(&self, flow: &FlowDefinition) -> Result<String, FormatError> {
        serde_json::to_string_pretty(flow).map_err(|e| FormatError::Serialization {
            format: "json",
            message: e.to_string(),
        })
    }

    fn validate(&self, source: &str) -> ValidationReport {
        // parse() already runs the JSON-specific structural checks, so
        // parse-and-catch is the complete validation here.
        match self.parse(source) {
            Ok(parsed) => ValidationReport::valid().with_warnings(parsed.warnings),
            Err(e) => ValidationReport::invalid(vec![e.to_string()]),
        }
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

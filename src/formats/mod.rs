pub mod dot;
pub mod json;
pub mod mermaid;
pub mod plantuml;

pub use dot::DotFormat;
pub use json::JsonFormat;
pub use mermaid::MermaidFormat;
pub use plantuml::PlantUmlFormat;

use crate::error::{FormatError, ParseError};
use crate::flow::{FlowDefinition, ValidationReport};

/// Successful parse payload: the flow plus any non-fatal diagnostics the
/// parser collected along the way.
#[derive(Debug, Clone)]
pub struct ParsedFlow {
    pub flow: FlowDefinition,
    pub warnings: Vec<String>,
}

impl ParsedFlow {
    pub fn new(flow: FlowDefinition) -> Self {
        Self {
            flow,
            warnings: Vec::new(),
        }
    }
}

/// Defines the contract for one diagram language: detection heuristic,
/// parser, and best-effort formatter.
///
/// Implementations are stateless unit structs; hosts construct them and hand
/// them to a `FormatRegistry` explicitly rather than relying on load-time
/// side effects.
pub trait FlowFormat: Send + Sync {
    /// Stable format identifier, e.g. `"dot"`.
    fn id(&self) -> &'static str;

    /// Human-facing name, e.g. `"Graphviz DOT"`.
    fn display_name(&self) -> &'static str;

    /// Confidence in `[0.0, 1.0]` that `source` is written in this format.
    /// Zero means "no signal".
    fn detect(&self, source: &str) -> f64;

    /// Parse `source` into a flow. All-or-nothing: an `Err` never carries a
    /// partial flow.
    fn parse(&self, source: &str) -> Result<ParsedFlow, ParseError>;

    /// Serialize a flow back to this format's text. Lossy for every format
    /// except JSON.
    fn format(&self, flow: &FlowDefinition) -> Result<String, FormatError>;

    /// Structural validation of raw source: parse-and-catch by default,
    /// formats may add checks of their own.
    fn validate(&self, source: &str) -> ValidationReport {
        match self.parse(source) {
            Ok(parsed) => ValidationReport::valid().with_warnings(parsed.warnings),
            Err(e) => ValidationReport::invalid(vec![e.to_string()]),
        }
    }
}

// ─── Shared text helpers ─────────────────────────────────────────────────────

/// Derives a display title from a node identifier: `_` and camelCase
/// boundaries become word breaks, each word capitalized.
/// `checkUserInput` / `check_user_input` → "Check User Input".
pub(crate) fn title_from_id(id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for segment in id.split(['_', '-']) {
        if segment.is_empty() {
            continue;
        }
        let mut word = String::new();
        for ch in segment.chars() {
            if ch.is_uppercase() && !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            word.push(ch);
        }
        if !word.is_empty() {
            words.push(word);
        }
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes HTML line breaks (`<br>`, `<br/>`, `<br />`) to `\n`.
pub(crate) fn unescape_breaks(text: &str) -> String {
    text.replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
}

/// Strips one pair of surrounding double quotes, if present.
pub(crate) fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Splits multi-line node text into summary `title` (first line) and full
/// `content` (only when the text actually spans multiple lines).
pub(crate) fn split_title_content(text: &str) -> (String, Option<String>) {
    match text.split_once('\n') {
        Some((first, _)) => (first.trim().to_string(), Some(text.to_string())),
        None => (text.to_string(), None),
    }
}

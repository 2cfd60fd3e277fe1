//! Graphviz DOT support: AST traversal into a `FlowDefinition` and a
//! best-effort `digraph` formatter.

pub mod ast;

use ahash::AHashMap;
use serde_json::Value;

use self::ast::{DotStatement, parse_dot};
use super::{FlowFormat, ParsedFlow, split_title_content, title_from_id};
use crate::error::{FormatError, ParseError};
use crate::flow::{FlowDefinition, NodeDefinition, OutletDefinition, synthesized_outlet_id};

pub struct DotFormat;

impl DotFormat {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DotFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// Quoted DOT ids may contain arbitrary text; node ids in a flow must stay
/// within the identifier charset so every formatter can re-emit them.
fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Collected facts from one depth-first pass over the statement list.
#[derive(Default)]
struct DotCollector {
    /// Sanitized node ids in first-seen order.
    order: Vec<String>,
    /// id -> label; the first non-empty label wins.
    labels: AHashMap<String, String>,
    /// id -> the source text it was sanitized from, for title derivation.
    originals: AHashMap<String, String>,
    /// (from, to, label) in declaration order.
    edges: Vec<(String, String, Option<String>)>,
    graph_label: Option<String>,
}

impl DotCollector {
    fn touch(&mut self, raw: &str, label: Option<&str>) -> String {
        let id = sanitize_id(raw);
        if !self.labels.contains_key(&id) {
            self.order.push(id.clone());
            self.labels.insert(id.clone(), String::new());
            self.originals.insert(id.clone(), raw.to_string());
        }
        if let Some(label) = label {
            let slot = self.labels.get_mut(&id).expect("id touched above");
            // A later plain reference must not blank out an earlier label.
            if slot.is_empty() && !label.is_empty() {
                *slot = label.to_string();
            }
        }
        id
    }

    fn walk(&mut self, statements: &[DotStatement], depth: usize) {
        for statement in statements {
            match statement {
                DotStatement::Node { id, attrs } => {
                    let label = attrs
                        .iter()
                        .find(|(k, _)| k == "label")
                        .map(|(_, v)| v.as_str());
                    self.touch(id, label);
                }
                DotStatement::Edge { endpoints, attrs } => {
                    let label = attrs
                        .iter()
                        .find(|(k, _)| k == "label")
                        .map(|(_, v)| v.clone());
                    // N-ary chains expand left to right into binary edges.
                    for pair in endpoints.windows(2) {
                        let from = self.touch(&pair[0], None);
                        let to = self.touch(&pair[1], None);
                        self.edges.push((from, to, label.clone()));
                    }
                }
                DotStatement::Attr { name, value } => {
                    if depth == 0 && name == "label" && self.graph_label.is_none() {
                        self.graph_label = Some(value.clone());
                    }
                }
                DotStatement::Subgraph { statements, .. } => {
                    self.walk(statements, depth + 1);
                }
            }
        }
    }
}

impl FlowFormat for DotFormat {
    fn id(&self) -> &'static str {
        "dot"
    }

    fn display_name(&self) -> &'static str {
        "Graphviz DOT"
    }

    fn detect(&self, source: &str) -> f64 {
        if parse_dot(source).is_ok() {
            return 0.9;
        }
        let trimmed = source.trim_start();
        let has_header = trimmed.starts_with("digraph")
            || trimmed.starts_with("graph")
            || trimmed.starts_with("strict");
        if has_header && source.contains('{') {
            // Looks DOT-shaped but did not parse; weak signal only, so a
            // valid Mermaid `graph TD` with `{diamond}` nodes outranks it.
            0.3
        } else {
            0.0
        }
    }

    fn parse(&self, source: &str) -> Result<ParsedFlow, ParseError> {
        let graph = parse_dot(source)?;

        let mut collector = DotCollector::default();
        collector.walk(&graph.statements, 0);

        // Group outlets by source node, keeping edge-declaration order.
        let mut outlets: AHashMap<&str, Vec<OutletDefinition>> = AHashMap::new();
        for (from, to, label) in &collector.edges {
            let list = outlets.entry(from.as_str()).or_default();
            let index = list.len();
            list.push(OutletDefinition {
                id: synthesized_outlet_id(from, to, index),
                to: to.clone(),
                label: label.clone(),
                condition: None,
            });
        }

        let mut has_incoming: AHashMap<&str, bool> = AHashMap::new();
        for (_, to, _) in &collector.edges {
            has_incoming.insert(to.as_str(), true);
        }

        let nodes: Vec<NodeDefinition> = collector
            .order
            .iter()
            .map(|id| {
                let label = &collector.labels[id];
                let (title, content) = if label.is_empty() {
                    // Derive the title from the pre-sanitization text, so
                    // quoted ids keep their wording.
                    let original = collector.originals.get(id).map(String::as_str).unwrap_or(id);
                    (title_from_id(original), None)
                } else {
                    split_title_content(label)
                };
                NodeDefinition {
                    id: id.clone(),
                    title,
                    content,
                    outlets: outlets.remove(id.as_str()),
                    actions: None,
                    auto_advance: None,
                }
            })
            .collect();

        // First node with outgoing edges and no incoming ones; else the
        // first collected node.
        let start_node_id = nodes
            .iter()
            .find(|n| {
                !n.outlets().is_empty() && !has_incoming.get(n.id.as_str()).copied().unwrap_or(false)
            })
            .or_else(|| nodes.first())
            .map(|n| n.id.clone())
            .unwrap_or_default();

        let title = collector
            .graph_label
            .clone()
            .or_else(|| graph.id.as_deref().map(title_from_id))
            .unwrap_or_default();

        let mut metadata = serde_json::Map::new();
        metadata.insert("format".to_string(), Value::String("dot".to_string()));
        if let Some(original) = &collector.graph_label {
            metadata.insert(
                "originalTitle".to_string(),
                Value::String(original.clone()),
            );
        }

        let flow = FlowDefinition {
            id: "dot-import".to_string(),
            title,
            description: None,
            start_node_id,
            nodes,
            global_state: None,
            metadata: Some(metadata),
        };

        flow.validate().map_err(|e| ParseError::InvalidDocument {
            format: "dot",
            message: e.to_string(),
        })?;

        Ok(ParsedFlow::new(flow))
    }

    fn format(&self, flow: &FlowDefinition) -> Result<String, FormatError> {
        let mut out = String::from("digraph flow {\n");
        if !flow.title.is_empty() {
            out.push_str(&format!("  label=\"{}\";\n", escape_label(&flow.title)));
        }

        if !flow.nodes.is_empty() {
            let start = flow
                .node(&flow.start_node_id)
                .ok_or_else(|| FormatError::StartNodeNotFound(flow.start_node_id.clone()))?;

            let mut queue = std::collections::VecDeque::from([start.id.as_str()]);
            let mut visited: Vec<&str> = Vec::new();
            let mut edges: Vec<String> = Vec::new();

            while let Some(id) = queue.pop_front() {
                if visited.contains(&id) {
                    continue;
                }
                visited.push(id);
                let Some(node) = flow.node(id) else { continue };

                let text = node.content.as_deref().unwrap_or(&node.title);
                out.push_str(&format!(
                    "  {} [label=\"{}\"];\n",
                    dot_id(&node.id),
                    escape_label(text)
                ));

                for outlet in node.outlets() {
                    match &outlet.label {
                        Some(label) => edges.push(format!(
                            "  {} -> {} [label=\"{}\"];",
                            dot_id(&node.id),
                            dot_id(&outlet.to),
                            escape_label(label)
                        )),
                        None => {
                            edges.push(format!("  {} -> {};", dot_id(&node.id), dot_id(&outlet.to)))
                        }
                    }
                    queue.push_back(outlet.to.as_str());
                }
            }

            for edge in edges {
                out.push_str(&edge);
                out.push('\n');
            }
        }

        out.push_str("}\n");
        Ok(out)
    }
}

/// Quote an identifier unless it is a bare DOT word.
fn dot_id(id: &str) -> String {
    let bare = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if bare {
        id.to_string()
    } else {
        format!("\"{}\"", escape_label(id))
    }
}

fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

//! Flow-to-Mermaid serialization, including the execution-highlight
//! variant used to render a traversed path.

use std::collections::VecDeque;

use itertools::Itertools;

use crate::error::FormatError;
use crate::flow::FlowDefinition;

/// Node ids and edges (`from` -> `to`) walked by an execution engine,
/// rendered with highlight styling.
#[derive(Debug, Clone, Default)]
pub struct ExecutionHighlights {
    pub traversed_nodes: Vec<String>,
    pub traversed_edges: Vec<(String, String)>,
}

impl ExecutionHighlights {
    fn node_traversed(&self, id: &str) -> bool {
        self.traversed_nodes.iter().any(|n| n == id)
    }

    fn edge_traversed(&self, from: &str, to: &str) -> bool {
        self.traversed_edges
            .iter()
            .any(|(f, t)| f == from && t == to)
    }
}

/// Serialize a flow as `flowchart TD`, optionally with highlight styling.
pub fn format_mermaid(
    flow: &FlowDefinition,
    highlights: Option<&ExecutionHighlights>,
) -> Result<String, FormatError> {
    let mut out = String::new();
    if !flow.title.is_empty() {
        out.push_str(&format!("---\ntitle: {}\n---\n", flow.title));
    }
    out.push_str("flowchart TD\n");

    if flow.nodes.is_empty() {
        return Ok(out);
    }

    let start = flow
        .node(&flow.start_node_id)
        .ok_or_else(|| FormatError::StartNodeNotFound(flow.start_node_id.clone()))?;

    let mut queue = VecDeque::from([start.id.as_str()]);
    let mut visited: Vec<&str> = Vec::new();
    let mut edge_lines: Vec<String> = Vec::new();

    while let Some(id) = queue.pop_front() {
        if visited.contains(&id) {
            continue;
        }
        visited.push(id);
        let Some(node) = flow.node(id) else { continue };

        let text = escape_text(node.content.as_deref().unwrap_or(&node.title));
        // Decision nodes get diamond braces.
        if node.outlets().len() >= 2 {
            out.push_str(&format!("    {}{{\"{}\"}}\n", node.id, text));
        } else {
            out.push_str(&format!("    {}[\"{}\"]\n", node.id, text));
        }

        for outlet in node.outlets() {
            let thick = highlights
                .map(|h| h.edge_traversed(&node.id, &outlet.to))
                .unwrap_or(false);
            let arrow = if thick { "==>" } else { "-->" };
            match &outlet.label {
                Some(label) => edge_lines.push(format!(
                    "    {} {}|{}| {}",
                    node.id,
                    arrow,
                    escape_text(label),
                    outlet.to
                )),
                None => edge_lines.push(format!("    {} {} {}", node.id, arrow, outlet.to)),
            }
            queue.push_back(outlet.to.as_str());
        }
    }

    for line in edge_lines {
        out.push_str(&line);
        out.push('\n');
    }

    if let Some(h) = highlights {
        let highlighted = visited
            .iter()
            .filter(|id| h.node_traversed(id))
            .copied()
            .collect_vec();
        if !highlighted.is_empty() {
            out.push_str("    classDef traversed fill:#d4f7d4,stroke:#2e7d32,stroke-width:2px\n");
            out.push_str(&format!(
                "    class {} traversed\n",
                highlighted.iter().join(",")
            ));
        }
    }

    Ok(out)
}

/// Mermaid label text: real newlines back to `<br>`, quotes doubled off.
fn escape_text(text: &str) -> String {
    text.replace('\n', "<br>").replace('"', "'")
}

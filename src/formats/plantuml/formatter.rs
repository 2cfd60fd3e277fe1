//! Flow-to-PlantUML serialization. Best-effort and lossy: binary decisions
//! become if/else blocks, reconvergence is expressed with label/goto, and
//! outlets beyond a decision's first two are not modeled.

use ahash::AHashMap;

use crate::error::FormatError;
use crate::flow::{FlowDefinition, NodeDefinition};

pub fn format_plantuml(flow: &FlowDefinition) -> Result<String, FormatError> {
    let mut out = String::from("@startuml\n");
    if !flow.title.is_empty() {
        out.push_str(&format!("title {}\n", flow.title));
    }

    if flow.nodes.is_empty() {
        out.push_str("@enduml\n");
        return Ok(out);
    }

    if flow.node(&flow.start_node_id).is_none() {
        return Err(FormatError::StartNodeNotFound(flow.start_node_id.clone()));
    }

    let mut in_degree: AHashMap<&str, usize> = AHashMap::new();
    for node in &flow.nodes {
        for outlet in node.outlets() {
            *in_degree.entry(outlet.to.as_str()).or_default() += 1;
        }
    }

    let mut emitter = Emitter {
        flow,
        in_degree,
        visited: Vec::new(),
        out: &mut out,
    };
    emitter.walk(&flow.start_node_id);

    out.push_str("@enduml\n");
    Ok(out)
}

struct Emitter<'a> {
    flow: &'a FlowDefinition,
    in_degree: AHashMap<&'a str, usize>,
    visited: Vec<String>,
    out: &'a mut String,
}

impl Emitter<'_> {
    fn walk(&mut self, id: &str) {
        if self.visited.iter().any(|v| v == id) {
            self.out.push_str(&format!("goto {}\n", id));
            return;
        }
        self.visited.push(id.to_string());

        let Some(node) = self.flow.node(id) else {
            return;
        };

        // Reconvergence targets need an addressable label.
        let degree = self.in_degree.get(id).copied().unwrap_or(0);
        let is_start = id == self.flow.start_node_id;
        if degree >= 2 || (is_start && degree >= 1) {
            self.out.push_str(&format!("label {}\n", id));
        }

        match node.outlets() {
            [] => {
                if is_start {
                    self.out.push_str("start\n");
                } else if !is_end_marker(node) {
                    self.out.push_str(&format!(":{};\n", activity_text(node)));
                }
                self.out.push_str("stop\n");
            }
            [only] => {
                if is_start {
                    self.out.push_str("start\n");
                } else {
                    self.out.push_str(&format!(":{};\n", activity_text(node)));
                }
                let target = only.to.clone();
                self.walk(&target);
            }
            [then_outlet, else_outlet, ..] => {
                if is_start {
                    self.out.push_str("start\n");
                }
                let then_label = then_outlet.label.clone().unwrap_or_else(|| "yes".to_string());
                let else_label = else_outlet.label.clone().unwrap_or_else(|| "no".to_string());
                let (then_to, else_to) = (then_outlet.to.clone(), else_outlet.to.clone());

                self.out
                    .push_str(&format!("if ({}) then ({})\n", node.title, then_label));
                self.walk(&then_to);
                self.out.push_str(&format!("else ({})\n", else_label));
                self.walk(&else_to);
                self.out.push_str("endif\n");
            }
        }
    }
}

fn activity_text(node: &NodeDefinition) -> String {
    let text = node.content.as_deref().unwrap_or(&node.title);
    text.replace('\n', " ").replace(';', ",")
}

/// True for nodes that already read as end markers, so the formatter emits
/// a bare `stop` instead of an activity line.
fn is_end_marker(node: &NodeDefinition) -> bool {
    node.title.eq_ignore_ascii_case("end") || node.title.eq_ignore_ascii_case("stop")
}

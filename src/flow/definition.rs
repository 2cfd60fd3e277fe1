use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The canonical definition of a flow: a directed, labeled graph with a
/// designated start node. Every parser produces this structure and every
/// formatter consumes it.
///
/// Node order is source-declaration order. It matters for deterministic
/// re-formatting, not for execution semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startNodeId", alias = "start_node_id", default)]
    pub start_node_id: String,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(
        rename = "globalState",
        alias = "global_state",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub global_state: Option<serde_json::Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, Value>>,
}

/// A single step in the flow. A node with no outlets is terminal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlets: Option<Vec<OutletDefinition>>,
    /// Opaque pass-through for downstream consumers; parsers never interpret it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Value>,
    #[serde(
        rename = "autoAdvance",
        alias = "auto_advance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_advance: Option<Value>,
}

/// A directed, optionally labeled edge from one node to another.
///
/// `condition` is opaque text for the execution engine; parsers only carry
/// it through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutletDefinition {
    #[serde(default)]
    pub id: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl FlowDefinition {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of outlets across all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.outlets().len()).sum()
    }

    /// Nodes with no outgoing outlets, in declaration order.
    pub fn terminal_nodes(&self) -> Vec<&NodeDefinition> {
        self.nodes.iter().filter(|n| n.outlets().is_empty()).collect()
    }
}

impl NodeDefinition {
    /// Outlets as a slice, treating absence as empty.
    pub fn outlets(&self) -> &[OutletDefinition] {
        self.outlets.as_deref().unwrap_or(&[])
    }

    /// Find an outlet on this node by target node id.
    pub fn outlet_to(&self, target: &str) -> Option<&OutletDefinition> {
        self.outlets().iter().find(|o| o.to == target)
    }
}

/// Builds the deterministic outlet id for formats whose source text has no
/// native edge identifiers: `{from}-{to}-{index}` where `index` is the
/// outlet's position within the source node.
pub fn synthesized_outlet_id(from: &str, to: &str, index: usize) -> String {
    format!("{}-{}-{}", from, to, index)
}

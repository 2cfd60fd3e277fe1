//! Mermaid flowchart support: line-oriented parser plus the styled
//! formatter in `formatter.rs`.

pub mod formatter;

use std::sync::LazyLock;

use ahash::AHashMap;
use regex::Regex;
use serde_json::Value;

use super::{FlowFormat, ParsedFlow, split_title_content, strip_quotes, title_from_id, unescape_breaks};
use crate::error::{FormatError, ParseError};
use crate::flow::{FlowDefinition, NodeDefinition, OutletDefinition, synthesized_outlet_id};

pub struct MermaidFormat;

impl MermaidFormat {
    pub fn new() -> Self {
        Self
    }

    /// Serialize with execution-highlight styling: traversed nodes get a
    /// `classDef`/`class` pair, traversed edges the thick `==>` arrow.
    pub fn format_with_highlights(
        &self,
        flow: &FlowDefinition,
        highlights: &formatter::ExecutionHighlights,
    ) -> Result<String, FormatError> {
        formatter::format_mermaid(flow, Some(highlights))
    }
}

impl Default for MermaidFormat {
    fn default() -> Self {
        Self::new()
    }
}

/// Arrow patterns in priority order; the first match wins.
/// 1. `A -- Label --> B`  2. `A -->|Label| B`  3. `A --> B`
static ARROW_WITH_DASH_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<from>.+?)\s+--\s*(?<label>.+?)\s*-->\s*(?<to>.+)$").unwrap());
static ARROW_WITH_PIPE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<from>.+?)\s*-->\s*\|(?<label>[^|]*)\|\s*(?<to>.+)$").unwrap());
static ARROW_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<from>.+?)\s*-->\s*(?<to>.+)$").unwrap());

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(flowchart|graph)\b").unwrap());
static NODE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<id>[A-Za-z_][A-Za-z0-9_-]*)\s*(?<rest>.*)$").unwrap());

/// Shape delimiter pairs, longest openers first so `((` is not read as `(`.
const SHAPE_DELIMITERS: &[(&str, &str)] = &[
    ("((", "))"), // circle
    ("{{", "}}"), // rhombus
    ("([", "])"), // stadium
    ("[[", "]]"), // subroutine
    ("[(", ")]"), // cylindrical
    (")", "("),   // cloud
    (">", "<"),   // hexagon
    ("[", "]"),   // rectangle
    ("(", ")"),   // round
    ("{", "}"),   // diamond
];

/// Directive keywords whose lines carry no node/edge content.
const SKIPPED_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "click",
    "direction",
];

/// One side of an arrow: identifier plus optional shaped text.
struct NodeTerm {
    id: String,
    text: Option<String>,
}

fn parse_node_term(term: &str) -> Option<NodeTerm> {
    let caps = NODE_ID.captures(term.trim())?;
    let id = caps["id"].to_string();
    let rest = caps["rest"].trim();
    if rest.is_empty() {
        return Some(NodeTerm { id, text: None });
    }
    for (open, close) in SHAPE_DELIMITERS {
        if let Some(inner) = rest
            .strip_prefix(open)
            .and_then(|r| r.strip_suffix(close))
        {
            let text = unescape_breaks(strip_quotes(inner));
            return Some(NodeTerm {
                id,
                text: Some(text),
            });
        }
    }
    None
}

#[derive(Default)]
struct MermaidCollector {
    order: Vec<String>,
    /// id -> shaped text; real text is never downgraded by a bare reference.
    texts: AHashMap<String, Option<String>>,
    edges: Vec<(String, String, Option<String>)>,
}

impl MermaidCollector {
    fn upsert(&mut self, term: NodeTerm) {
        match self.texts.get_mut(&term.id) {
            None => {
                self.order.push(term.id.clone());
                self.texts.insert(term.id, term.text);
            }
            Some(existing) => {
                if existing.is_none() && term.text.is_some() {
                    *existing = term.text;
                }
            }
        }
    }

    fn line(&mut self, line: &str) {
        let matched = [
            (&*ARROW_WITH_DASH_LABEL, true),
            (&*ARROW_WITH_PIPE_LABEL, true),
            (&*ARROW_PLAIN, false),
        ]
        .iter()
        .find_map(|(re, labeled)| {
            let caps = re.captures(line)?;
            let from = parse_node_term(&caps["from"])?;
            let to = parse_node_term(&caps["to"])?;
            let label = if *labeled {
                let text = caps["label"].trim().to_string();
                (!text.is_empty()).then_some(text)
            } else {
                None
            };
            Some((from, to, label))
        });

        if let Some((from, to, label)) = matched {
            let edge = (from.id.clone(), to.id.clone(), label);
            self.upsert(from);
            self.upsert(to);
            self.edges.push(edge);
        } else if let Some(term) = parse_node_term(line) {
            // Standalone node declaration.
            self.upsert(term);
        }
    }
}

/// Extracted YAML front matter plus the remaining body.
struct FrontMatter<'a> {
    title: Option<String>,
    description: Option<String>,
    body: &'a str,
}

fn strip_front_matter(source: &str) -> FrontMatter<'_> {
    let mut fm = FrontMatter {
        title: None,
        description: None,
        body: source,
    };
    let Some(rest) = source.strip_prefix("---") else {
        return fm;
    };
    let Some((block, body)) = rest.split_once("\n---") else {
        return fm;
    };
    for line in block.lines() {
        if let Some(value) = line.trim().strip_prefix("title:") {
            fm.title = Some(strip_quotes(value).to_string());
        } else if let Some(value) = line.trim().strip_prefix("description:") {
            fm.description = Some(strip_quotes(value).to_string());
        }
    }
    fm.body = body.trim_start_matches(|c| c == '-').trim_start_matches('\n');
    fm
}

impl FlowFormat for MermaidFormat {
    fn id(&self) -> &'static str {
        "mermaid"
    }

    fn display_name(&self) -> &'static str {
        "Mermaid Flowchart"
    }

    fn detect(&self, source: &str) -> f64 {
        let body = strip_front_matter(source).body;
        let first_line = body
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with("%%"))
            .unwrap_or("");
        if HEADER.is_match(first_line) {
            return 0.9;
        }
        if body.lines().any(|l| l.contains("-->")) {
            return 0.55;
        }
        0.0
    }

    fn parse(&self, source: &str) -> Result<ParsedFlow, ParseError> {
        let fm = strip_front_matter(source);

        let mut collector = MermaidCollector::default();
        for raw in fm.body.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("%%") || HEADER.is_match(line) {
                continue;
            }
            let keyword = line.split_whitespace().next().unwrap_or("");
            if SKIPPED_KEYWORDS.contains(&keyword) {
                continue;
            }
            collector.line(line);
        }

        if collector.order.is_empty() {
            return Err(ParseError::InvalidDocument {
                format: "mermaid",
                message: "no nodes found in flowchart".to_string(),
            });
        }

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

        let nodes: Vec<NodeDefinition> = collector
            .order
            .iter()
            .map(|id| {
                let (title, content) = match &collector.texts[id] {
                    Some(text) => split_title_content(text),
                    None => (title_from_id(id), None),
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

        let mut metadata = serde_json::Map::new();
        metadata.insert("format".to_string(), Value::String("mermaid".to_string()));
        if let Some(original) = &fm.title {
            metadata.insert(
                "originalTitle".to_string(),
                Value::String(original.clone()),
            );
        }

        let flow = FlowDefinition {
            id: "mermaid-import".to_string(),
            title: fm.title.unwrap_or_default(),
            description: fm.description,
            // Mermaid has no root marker; first node in source order.
            start_node_id: collector.order[0].clone(),
            nodes,
            global_state: None,
            metadata: Some(metadata),
        };

        flow.validate().map_err(|e| ParseError::InvalidDocument {
            format: "mermaid",
            message: e.to_string(),
        })?;

        Ok(ParsedFlow::new(flow))
    }

    fn format(&self, flow: &FlowDefinition) -> Result<String, FormatError> {
        formatter::format_mermaid(flow, None)
    }
}

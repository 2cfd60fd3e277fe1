//! The activity-diagram control-flow builder: an explicit parser state with
//! one named transition per construct. Structured branches (if/elseif/else)
//! and unstructured jumps (label/goto) both land in one flat graph, with
//! merge points tracking where branches reconverge.

use ahash::AHashMap;
use itertools::Itertools;

use crate::flow::{NodeDefinition, OutletDefinition, synthesized_outlet_id};

/// Which branch of the innermost open conditional statements currently
/// attach to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Branch {
    Then,
    Else,
}

/// One open conditional. `elseif` pushes a sibling frame chained off the
/// previous decision's "no" edge; `endif` drains them all at once.
#[derive(Debug)]
struct IfFrame {
    decision_id: String,
    then_label: String,
    else_label: String,
    branch: Branch,
    /// The decision's then/else edge has been emitted.
    then_connected: bool,
    else_connected: bool,
    /// A goto consumed the branch, so endif must not merge it.
    then_jumped: bool,
    else_jumped: bool,
    /// Terminal node of a closed-out branch, recorded lazily.
    then_terminal: Option<String>,
    else_terminal: Option<String>,
    /// An elseif chained off this frame's "no" edge.
    no_edge_chained: bool,
}

/// A node waiting to be connected to whatever statement comes next. Plain
/// branch terminals carry no label; a decision whose branch was never taken
/// carries that branch's label.
#[derive(Debug, Clone, PartialEq)]
struct MergeSource {
    from: String,
    label: Option<String>,
}

/// A `goto` whose label may be declared later; resolved after the full
/// document has been scanned.
#[derive(Debug)]
struct GotoTarget {
    from: String,
    label_name: String,
    edge_label: Option<String>,
}

/// Parser state threaded through every line of an activity diagram.
/// Fresh per parse call, so node ids (`start_1`, `decision_2`, ...) are
/// deterministic across invocations.
pub struct ParserState {
    nodes: Vec<NodeDefinition>,
    index: AHashMap<String, usize>,
    counter: u32,
    /// Node the next statement connects from; `None` means "wait for a merge".
    current: Option<String>,
    if_stack: Vec<IfFrame>,
    labels: AHashMap<String, String>,
    pending_labels: Vec<String>,
    goto_targets: Vec<GotoTarget>,
    merge_points: Vec<MergeSource>,
    start_node_id: Option<String>,
    warnings: Vec<String>,
}

impl ParserState {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: AHashMap::new(),
            counter: 0,
            current: None,
            if_stack: Vec::new(),
            labels: AHashMap::new(),
            pending_labels: Vec::new(),
            goto_targets: Vec::new(),
            merge_points: Vec::new(),
            start_node_id: None,
            warnings: Vec::new(),
        }
    }

    // ── node / edge plumbing ─────────────────────────────────────────────

    fn create_node(&mut self, kind: &str, title: String, content: Option<String>) -> String {
        self.counter += 1;
        let id = format!("{}_{}", kind, self.counter);
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(NodeDefinition {
            id: id.clone(),
            title,
            content,
            outlets: None,
            actions: None,
            auto_advance: None,
        });
        // Queued `label` statements all bind to the next created node.
        for name in self.pending_labels.drain(..) {
            self.labels.insert(name, id.clone());
        }
        id
    }

    fn add_edge(&mut self, from: &str, to: &str, label: Option<String>) {
        let Some(&position) = self.index.get(from) else {
            return;
        };
        let node = &mut self.nodes[position];
        let outlets = node.outlets.get_or_insert_with(Vec::new);
        // One edge per (target, label) pair; merges can try twice.
        if outlets
            .iter()
            .any(|o| o.to == to && o.label == label)
        {
            return;
        }
        let index = outlets.len();
        outlets.push(OutletDefinition {
            id: synthesized_outlet_id(from, to, index),
            to: to.to_string(),
            label,
            condition: None,
        });
    }

    /// Connect an incoming statement's node: flush pending merge points, or
    /// emit the branch edge of an open conditional, or follow `current`.
    fn connect_into(&mut self, id: &str) {
        if !self.merge_points.is_empty() {
            let sources = std::mem::take(&mut self.merge_points);
            for source in sources.into_iter().unique_by(|s| (s.from.clone(), s.label.clone())) {
                self.add_edge(&source.from, id, source.label);
            }
            self.current = Some(id.to_string());
            return;
        }

        if let Some(frame) = self.if_stack.last_mut() {
            if self.current.as_deref() == Some(frame.decision_id.as_str()) {
                match frame.branch {
                    Branch::Then if !frame.then_connected && !frame.then_jumped => {
                        let (from, label) =
                            (frame.decision_id.clone(), frame.then_label.clone());
                        frame.then_connected = true;
                        self.add_edge(&from, id, Some(label));
                        self.current = Some(id.to_string());
                        return;
                    }
                    Branch::Else if !frame.else_connected && !frame.else_jumped => {
                        let (from, label) =
                            (frame.decision_id.clone(), frame.else_label.clone());
                        frame.else_connected = true;
                        self.add_edge(&from, id, Some(label));
                        self.current = Some(id.to_string());
                        return;
                    }
                    _ => {}
                }
            }
        }

        if let Some(current) = self.current.clone() {
            self.add_edge(&current, id, None);
        }
        self.current = Some(id.to_string());
    }

    // ── transitions, one per construct ───────────────────────────────────

    pub fn on_start(&mut self) {
        let id = self.create_node("start", "Start".to_string(), None);
        self.connect_into(&id);
        self.start_node_id.get_or_insert(id);
    }

    pub fn on_stop(&mut self) {
        let id = self.create_node("end", "End".to_string(), None);
        self.connect_into(&id);
        // An end node never connects onward.
        self.current = None;
    }

    pub fn on_activity(&mut self, title: String, content: Option<String>) {
        let id = self.create_node("activity", title, content);
        self.connect_into(&id);
    }

    pub fn on_if(&mut self, condition: String, then_label: Option<String>) {
        let id = self.create_node("decision", condition, None);
        self.connect_into(&id);
        self.if_stack.push(IfFrame {
            decision_id: id.clone(),
            then_label: then_label.unwrap_or_else(|| "yes".to_string()),
            else_label: "no".to_string(),
            branch: Branch::Then,
            then_connected: false,
            else_connected: false,
            then_jumped: false,
            else_jumped: false,
            then_terminal: None,
            else_terminal: None,
            no_edge_chained: false,
        });
        self.current = Some(id);
    }

    pub fn on_elseif(
        &mut self,
        condition: String,
        then_label: Option<String>,
        no_label: Option<String>,
    ) {
        let Some(top) = self.if_stack.last_mut() else {
            self.warnings
                .push("'elseif' outside of an open 'if' was ignored".to_string());
            return;
        };

        // Close out the running then-branch of the previous decision.
        if self.current.as_deref() != Some(top.decision_id.as_str()) {
            top.then_terminal = self.current.clone();
        }
        top.no_edge_chained = true;
        let previous_decision = top.decision_id.clone();
        let no_edge_label = no_label.unwrap_or_else(|| top.else_label.clone());

        let id = self.create_node("decision", condition, None);
        self.add_edge(&previous_decision, &id, Some(no_edge_label));
        self.if_stack.push(IfFrame {
            decision_id: id.clone(),
            then_label: then_label.unwrap_or_else(|| "yes".to_string()),
            else_label: "no".to_string(),
            branch: Branch::Then,
            then_connected: false,
            else_connected: false,
            then_jumped: false,
            else_jumped: false,
            then_terminal: None,
            else_terminal: None,
            no_edge_chained: false,
        });
        self.current = Some(id);
    }

    pub fn on_else(&mut self, label: Option<String>) {
        let Some(top) = self.if_stack.last_mut() else {
            self.warnings
                .push("'else' outside of an open 'if' was ignored".to_string());
            return;
        };
        if self.current.as_deref() != Some(top.decision_id.as_str()) {
            top.then_terminal = self.current.clone();
        }
        if let Some(label) = label {
            top.else_label = label;
        }
        top.branch = Branch::Else;
        self.current = Some(top.decision_id.clone());
    }

    pub fn on_endif(&mut self) {
        if self.if_stack.is_empty() {
            self.warnings
                .push("'endif' without an open 'if' was ignored".to_string());
            return;
        }

        // Record the still-running branch of the innermost frame.
        if let Some(top) = self.if_stack.last_mut() {
            if self.current.as_deref() != Some(top.decision_id.as_str()) {
                match top.branch {
                    Branch::Then => top.then_terminal = self.current.clone(),
                    Branch::Else => top.else_terminal = self.current.clone(),
                }
            }
        }

        // Chained elseif frames form one logical if: drain them all.
        for frame in self.if_stack.drain(..) {
            for terminal in [&frame.then_terminal, &frame.else_terminal].into_iter().flatten() {
                // A decision terminal's branches are handled via its own frame.
                if !terminal.starts_with("decision_") {
                    self.merge_points.push(MergeSource {
                        from: terminal.clone(),
                        label: None,
                    });
                }
            }
            // Untaken branches leave the decision's labeled edge pending,
            // to be resolved against whatever comes next.
            if !frame.then_connected && !frame.then_jumped && frame.then_terminal.is_none() {
                self.merge_points.push(MergeSource {
                    from: frame.decision_id.clone(),
                    label: Some(frame.then_label.clone()),
                });
            }
            let else_open = !frame.else_connected
                && !frame.else_jumped
                && !frame.no_edge_chained
                && frame.else_terminal.is_none();
            if else_open {
                self.merge_points.push(MergeSource {
                    from: frame.decision_id.clone(),
                    label: Some(frame.else_label.clone()),
                });
            }
        }

        self.current = None;
    }

    pub fn on_label(&mut self, name: String) {
        self.pending_labels.push(name);
    }

    pub fn on_goto(&mut self, name: String) {
        if let Some(frame) = self.if_stack.last_mut() {
            if self.current.as_deref() == Some(frame.decision_id.as_str()) {
                // The branch consists of just this jump; emit the branch
                // edge now (or defer it) and mark the branch processed so
                // endif does not merge it.
                let edge_label = match frame.branch {
                    Branch::Then => {
                        frame.then_jumped = true;
                        frame.then_label.clone()
                    }
                    Branch::Else => {
                        frame.else_jumped = true;
                        frame.else_label.clone()
                    }
                };
                let from = frame.decision_id.clone();
                self.emit_goto(from, name, Some(edge_label));
                return;
            }
        }

        if let Some(current) = self.current.take() {
            self.emit_goto(current, name, None);
        } else {
            self.warnings
                .push(format!("'goto {}' had no source node and was ignored", name));
        }
    }

    fn emit_goto(&mut self, from: String, label_name: String, edge_label: Option<String>) {
        match self.labels.get(&label_name) {
            Some(target) => {
                let target = target.clone();
                self.add_edge(&from, &target, edge_label);
            }
            // Forward reference: resolve once the whole document is read.
            None => self.goto_targets.push(GotoTarget {
                from,
                label_name,
                edge_label,
            }),
        }
    }

    /// Post-pass: resolve deferred gotos, pick the start node, and hand the
    /// arena over.
    pub fn finish(mut self) -> (Vec<NodeDefinition>, Option<String>, Vec<String>) {
        let deferred = std::mem::take(&mut self.goto_targets);
        for goto in deferred {
            match self.labels.get(&goto.label_name) {
                Some(target) => {
                    let target = target.clone();
                    self.add_edge(&goto.from, &target, goto.edge_label);
                }
                None => self.warnings.push(format!(
                    "goto target '{}' was never declared; edge from '{}' dropped",
                    goto.label_name, goto.from
                )),
            }
        }

        let start = self
            .start_node_id
            .clone()
            .or_else(|| self.nodes.first().map(|n| n.id.clone()));

        (self.nodes, start, self.warnings)
    }

    #[cfg(test)]
    fn node(&self, id: &str) -> Option<&NodeDefinition> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

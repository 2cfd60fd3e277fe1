use ahash::AHashSet;

use super::definition::FlowDefinition;
use crate::error::FlowValidationError;

/// Outcome of a structural validation pass, as surfaced by CLI `validate`
/// commands. Warnings are non-fatal.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl FlowDefinition {
    /// Checks the structural invariants every parser must uphold: unique
    /// node ids, a resolvable start node, no dangling outlet targets.
    pub fn validate(&self) -> Result<(), FlowValidationError> {
        let mut ids: AHashSet<&str> = AHashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(FlowValidationError::DuplicateNodeId(node.id.clone()));
            }
        }

        if self.start_node_id.is_empty() {
            if !self.nodes.is_empty() {
                return Err(FlowValidationError::StartNodeUnset);
            }
        } else if !ids.contains(self.start_node_id.as_str()) {
            return Err(FlowValidationError::StartNodeMissing(
                self.start_node_id.clone(),
            ));
        }

        for node in &self.nodes {
            for outlet in node.outlets() {
                if !ids.contains(outlet.to.as_str()) {
                    return Err(FlowValidationError::DanglingOutlet {
                        node_id: node.id.clone(),
                        outlet_id: outlet.id.clone(),
                        target: outlet.to.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and traits from the flowdef
//! crate. Import this module to get access to the core functionality without
//! having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowdef::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let registry = FormatRegistry::with_builtin_formats();
//! let source = std::fs::read_to_string("path/to/diagram.puml")?;
//!
//! let document = registry.parse(&source)?;
//! println!(
//!     "Parsed {} as {}: {} nodes",
//!     document.flow.title,
//!     document.format,
//!     document.flow.node_count()
//! );
//! # Ok(())
//! # }
//! ```

// Data model
pub use crate::flow::{
    FlowDefinition, NodeDefinition, OutletDefinition, ValidationReport,
};

// Registry and detection
pub use crate::registry::{Detection, FormatRegistry, ParsedDocument, UNKNOWN_FORMAT};

// Format implementations and the extension trait
pub use crate::formats::{
    DotFormat, FlowFormat, JsonFormat, MermaidFormat, ParsedFlow, PlantUmlFormat,
};
pub use crate::formats::mermaid::formatter::ExecutionHighlights;

// Error types
pub use crate::error::{FlowValidationError, FormatError, ParseError, RegistryError};

// Standard library re-exports commonly used with this crate
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

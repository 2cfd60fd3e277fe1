//! # Flowdef - Multi-Format Flowchart Parsing Engine
//!
//! **Flowdef** turns human-authored diagram text — Graphviz DOT, Mermaid
//! flowcharts, PlantUML activity diagrams, or a native JSON form — into one
//! canonical, directed, labeled graph: the [`FlowDefinition`](flow::FlowDefinition).
//! An external execution engine walks that graph step by step; this crate
//! only detects, parses, and (best-effort) re-serializes.
//!
//! ## Core Workflow
//!
//! 1.  **Build a registry**: `FormatRegistry::with_builtin_formats()` installs
//!     the four builtin formats. Custom formats implement
//!     [`FlowFormat`](formats::FlowFormat) and are registered explicitly —
//!     there is no global registry and no import-time side effect.
//! 2.  **Detect**: `registry.detect_format(text)` ranks every installed
//!     detector and reports the best match (or `"unknown"`).
//! 3.  **Parse**: `registry.parse(text)` detects and dispatches to the
//!     winning parser, returning the flow, the format id, and any non-fatal
//!     warnings.
//! 4.  **Format**: `registry.format_as(&flow, "mermaid")` serializes a flow
//!     back out. Only JSON round-trips losslessly.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowdef::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let registry = FormatRegistry::with_builtin_formats();
//!
//!     let source = "digraph G {\n  A [label=\"Start\"];\n  A -> B [label=\"Next\"];\n}";
//!
//!     let detection = registry.detect_format(source);
//!     assert_eq!(detection.format, "dot");
//!
//!     let document = registry.parse(source)?;
//!     assert_eq!(document.flow.start_node_id, "A");
//!
//!     // Convert to Mermaid.
//!     let mermaid = registry
//!         .format_as(&document.flow, "mermaid")
//!         .expect("mermaid is a builtin format")?;
//!     assert!(mermaid.contains("flowchart TD"));
//!     Ok(())
//! }
//! ```
//!
//! All parsing is synchronous, pure, and deterministic: the same input text
//! always yields a structurally identical flow, and synthesized node ids
//! come from per-parse counters, never clocks or randomness.

pub mod error;
pub mod flow;
pub mod formats;
pub mod prelude;
pub mod registry;

pub use flow::{FlowDefinition, NodeDefinition, OutletDefinition};
pub use registry::FormatRegistry;

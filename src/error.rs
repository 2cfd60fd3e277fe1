use thiserror::Error;

/// Errors raised while parsing source text into a `FlowDefinition`.
///
/// Parsing is all-or-nothing: a parser never returns a partially populated
/// flow alongside one of these.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("{format} syntax error at line {line}: {message}")]
    Syntax {
        format: &'static str,
        line: usize,
        message: String,
    },

    #[error("Input is not valid {format}: {message}")]
    InvalidDocument {
        format: &'static str,
        message: String,
    },

    #[error("Failed to parse flow JSON: {0}")]
    Json(String),

    #[error("Flow JSON is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Flow JSON field '{field}' has the wrong type: expected {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Node at index {index} is missing a string 'id'")]
    NodeMissingId { index: usize },

    #[error("startNodeId '{0}' does not match any node id")]
    StartNodeNotFound(String),
}

/// Errors raised while serializing a `FlowDefinition` back to text.
#[derive(Error, Debug, Clone)]
pub enum FormatError {
    #[error("Cannot format flow: start node '{0}' not found")]
    StartNodeNotFound(String),

    #[error("Failed to serialize flow to {format}: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },
}

/// Errors surfaced by the `FormatRegistry`.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(
        "Format '{id}' is already registered by '{existing_source}' (attempted re-registration from '{attempted_source}')"
    )]
    DuplicateFormat {
        id: String,
        existing_source: String,
        attempted_source: String,
    },

    #[error("No registered format matched the input text")]
    UnknownFormat,

    #[error("Parsing as '{format}' failed: {source}")]
    Parse {
        format: String,
        #[source]
        source: ParseError,
    },
}

/// Structural invariant violations in an already-constructed `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowValidationError {
    #[error("Duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error("Start node '{0}' does not exist in the flow")]
    StartNodeMissing(String),

    #[error("Flow has nodes but no start node id")]
    StartNodeUnset,

    #[error("Outlet '{outlet_id}' on node '{node_id}' targets unknown node '{target}'")]
    DanglingOutlet {
        node_id: String,
        outlet_id: String,
        target: String,
    },
}

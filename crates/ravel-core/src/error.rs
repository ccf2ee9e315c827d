use thiserror::Error;

use crate::types::NodeId;

#[derive(Debug, Error)]
pub enum RavelError {
    // Graph errors
    #[error("Dialog has no start node")]
    MissingStartNode,

    #[error("No node with id {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a returning function node and cannot provide a value")]
    InvalidValueSource(NodeId),

    #[error("Function node {0} returns void and must declare a next node")]
    MissingNext(NodeId),

    #[error("Random selector node {0} has no branches")]
    EmptyBranchList(NodeId),

    // Handler errors
    #[error("No handler registered for node type: {0}")]
    UnregisteredNodeType(String),

    #[error("A handler is already registered for node type: {0}")]
    DuplicateHandler(String),

    #[error("Handler for {expected} received a {found} node (id {node})")]
    UnexpectedNodeKind {
        node: NodeId,
        expected: String,
        found: String,
    },

    #[error("Node {node} is not a valid {node_type} node: {message}")]
    InvalidNode {
        node: NodeId,
        node_type: String,
        message: String,
    },

    // Method errors
    #[error("No method with name {0}")]
    UnknownMethod(String),

    #[error("Function node {node} ({method}) expected to return {expected}, got {found}")]
    WrongReturnType {
        node: NodeId,
        method: String,
        expected: String,
        found: String,
    },

    // Condition errors
    #[error("Unsupported comparison operator: {0}")]
    UnsupportedOperator(String),

    #[error("Cannot order {left} against {right}")]
    IncomparableValues { left: String, right: String },

    // Input errors
    #[error("Invalid selection {input:?} (expected {min}-{max})")]
    InvalidSelection { input: String, min: usize, max: usize },

    #[error("No input")]
    NoInput,

    #[error("Dialog run cancelled")]
    Cancelled,

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Dialog file not found: {0}")]
    DialogNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RavelError>;

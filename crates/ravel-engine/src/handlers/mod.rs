//! Node handlers shipped with the engine.
//!
//! `builtin` and `flow_control` cover every built-in node type and are
//! registered by [`NodeRegistry::with_builtins`](crate::NodeRegistry::with_builtins).
//! `shop` is an extension handler that hosts register explicitly.

pub mod builtin;
pub mod flow_control;
pub mod shop;

use ravel_core::error::{RavelError, Result};
use ravel_core::graph::Node;

/// Error for a handler that received a node of another kind.
pub(crate) fn unexpected_kind(node: &Node, expected: &str) -> RavelError {
    RavelError::UnexpectedNodeKind {
        node: node.id,
        expected: expected.to_string(),
        found: node.type_tag().to_string(),
    }
}

/// Parse a numeric menu selection within `min..=max`.
pub(crate) fn parse_selection(input: &str, min: usize, max: usize) -> Result<usize> {
    let invalid = || RavelError::InvalidSelection {
        input: input.to_string(),
        min,
        max,
    };

    let selection: usize = input.trim().parse().map_err(|_| invalid())?;
    if selection < min || selection > max {
        return Err(invalid());
    }
    Ok(selection)
}

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use ravel_core::error::{RavelError, Result};
use ravel_core::graph::Node;
use ravel_core::types::NodeId;

use crate::controller::DialogController;
use crate::handler::NodeHandler;
use crate::handlers::{builtin, flow_control};

/// Registry mapping node type tags to their handlers.
///
/// Registration never overwrites: a second handler for the same tag is
/// rejected and the first stays in effect.
pub struct NodeRegistry {
    handlers: HashMap<String, Arc<dyn NodeHandler>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a node type.
    pub fn register(&mut self, node_type: impl Into<String>, handler: impl NodeHandler) -> Result<()> {
        let node_type = node_type.into();
        if self.handlers.contains_key(&node_type) {
            return Err(RavelError::DuplicateHandler(node_type));
        }
        debug!(node_type = %node_type, "Registered node handler");
        self.handlers.insert(node_type, Arc::new(handler));
        Ok(())
    }

    /// Get the handler for a node type.
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeHandler>> {
        self.handlers.get(node_type).cloned()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    /// List all registered node types.
    pub fn list(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }

    /// Run the handler registered for `node`'s type.
    pub async fn dispatch(
        &self,
        node: &Node,
        controller: &DialogController,
    ) -> Result<Option<NodeId>> {
        let handler = self
            .get(node.type_tag())
            .ok_or_else(|| RavelError::UnregisteredNodeType(node.type_tag().to_string()))?;

        handler.handle(node, controller).await
    }

    /// Create a registry with all built-in node types registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        // Freshly created, so none of these tags can collide.
        for (tag, handler) in builtin_handlers() {
            registry.handlers.insert(tag.to_string(), handler);
        }

        registry
    }
}

fn builtin_handlers() -> Vec<(&'static str, Arc<dyn NodeHandler>)> {
    vec![
        // ── Built-in ────────────────────────────────────────────
        ("start", Arc::new(builtin::StartHandler)),
        ("end", Arc::new(builtin::EndHandler)),
        ("text", Arc::new(builtin::TextHandler)),
        ("function", Arc::new(builtin::FunctionHandler)),
        // ── Flow control ────────────────────────────────────────
        ("choice", Arc::new(flow_control::ChoiceHandler)),
        ("if", Arc::new(flow_control::IfHandler)),
        ("delay", Arc::new(flow_control::DelayHandler)),
        ("randomSelector", Arc::new(flow_control::RandomSelectorHandler)),
        ("switch", Arc::new(flow_control::SwitchHandler)),
    ]
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use futures::future::{try_join_all, BoxFuture};
use tracing::debug;

use ravel_core::error::{RavelError, Result};
use ravel_core::graph::{FunctionNode, Node, NodeKind};
use ravel_core::traits::default_validate;
use ravel_core::types::{NodeId, ReturnType, RunEvent, Value, TERMINAL_NODE};

use super::unexpected_kind;
use crate::controller::DialogController;
use crate::handler::NodeHandler;

pub struct StartHandler;

impl NodeHandler for StartHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        _controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            match &node.kind {
                NodeKind::Start(start) => Ok(Some(start.next)),
                _ => Err(unexpected_kind(node, "start")),
            }
        })
    }
}

pub struct EndHandler;

impl NodeHandler for EndHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        _controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            match &node.kind {
                NodeKind::End(_) => Ok(Some(TERMINAL_NODE)),
                _ => Err(unexpected_kind(node, "end")),
            }
        })
    }
}

/// Shows a line of dialog and waits for the player to acknowledge it.
pub struct TextHandler;

impl NodeHandler for TextHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::Text(text) = &node.kind else {
                return Err(unexpected_kind(node, "text"));
            };

            controller.output_inline(&format!("Dialog: {}", text.text));
            controller.input("", &default_validate).await?;

            Ok(Some(text.next))
        })
    }
}

/// Calls a void host method as a traversal step.
pub struct FunctionHandler;

impl NodeHandler for FunctionHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::Function(function) = &node.kind else {
                return Err(unexpected_kind(node, "function"));
            };

            if function.return_type != ReturnType::Void {
                return Err(RavelError::WrongReturnType {
                    node: node.id,
                    method: function.method_name.clone(),
                    expected: ReturnType::Void.to_string(),
                    found: function.return_type.to_string(),
                });
            }

            // Return value of a void method is discarded
            let _ = call_method(controller, node.id, function).await?;

            function.next.map(Some).ok_or(RavelError::MissingNext(node.id))
        })
    }
}

/// Invoke a returning function node and produce its value.
///
/// Used by value resolution only; this is not a traversal step. The value
/// the method returns must match the node's declared return type.
pub async fn invoke_returning_function(
    controller: &DialogController,
    node_id: NodeId,
    function: &FunctionNode,
) -> Result<Value> {
    let wrong_type = |found: String| RavelError::WrongReturnType {
        node: node_id,
        method: function.method_name.clone(),
        expected: function.return_type.to_string(),
        found,
    };

    if function.return_type == ReturnType::Void {
        return Err(RavelError::WrongReturnType {
            node: node_id,
            method: function.method_name.clone(),
            expected: "a value".to_string(),
            found: ReturnType::Void.to_string(),
        });
    }

    match call_method(controller, node_id, function).await? {
        Some(value) if function.return_type.accepts(&value) => Ok(value),
        Some(value) => Err(wrong_type(value.kind().to_string())),
        None => Err(wrong_type("nothing".to_string())),
    }
}

/// Look up the node's method, resolve its parameters, and call it.
///
/// Parameters resolve concurrently; the method receives them in declared
/// order.
async fn call_method(
    controller: &DialogController,
    node_id: NodeId,
    function: &FunctionNode,
) -> Result<Option<Value>> {
    let method = controller
        .methods()
        .get(&function.method_name)
        .ok_or_else(|| RavelError::UnknownMethod(function.method_name.clone()))?;

    let parameters = try_join_all(
        function
            .parameters
            .iter()
            .map(|param| controller.resolve_value(param)),
    )
    .await?;

    debug!(
        node_id,
        method = %function.method_name,
        params = parameters.len(),
        "Invoking dialog method"
    );
    controller.publish(RunEvent::MethodInvoked {
        run_id: controller.run_id().clone(),
        method: function.method_name.clone(),
    });

    Ok(method(&parameters))
}

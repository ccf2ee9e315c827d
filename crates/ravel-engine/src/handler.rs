use futures::future::BoxFuture;

use ravel_core::error::Result;
use ravel_core::graph::Node;
use ravel_core::types::NodeId;

use crate::controller::DialogController;

/// Node handler — the executable behavior bound to a node type.
///
/// Returns the id of the next node. `None`, `Some(0)` and
/// [`TERMINAL_NODE`] all end the run (see [`ends_run`]), so `0` is never
/// followed as an edge. Handlers never move the controller's cursor
/// themselves.
///
/// [`TERMINAL_NODE`]: ravel_core::types::TERMINAL_NODE
/// [`ends_run`]: ravel_core::types::ends_run
pub trait NodeHandler: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>>;
}

/// A [`NodeHandler`] backed by a plain function.
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a function as a node handler.
///
/// ```ignore
/// fn banner<'a>(node: &'a Node, ctl: &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>> {
///     Box::pin(async move { ctl.output("***"); Ok(Some(node.id + 1)) })
/// }
/// registry.register("banner", handler_fn(banner))?;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a Node, &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>>
        + Send
        + Sync
        + 'static,
{
    FnHandler { f }
}

impl<F> NodeHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a Node, &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        (self.f)(node, controller)
    }
}

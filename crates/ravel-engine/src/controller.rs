use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ravel_core::config::EngineConfig;
use ravel_core::error::{RavelError, Result};
use ravel_core::event::EventBus;
use ravel_core::graph::{Dialog, NodeKind};
use ravel_core::methods::MethodTable;
use ravel_core::traits::{DialogIo, InputValidator};
use ravel_core::types::{
    ends_run, Condition, NodeId, ReturnType, RunEvent, RunId, RunOutcome, Value, ValueRef,
};

use crate::condition;
use crate::handler::NodeHandler;
use crate::handlers::builtin;
use crate::registry::NodeRegistry;

/// Executes a dialog graph.
///
/// The controller owns the dialog, the node handler registry, and the host
/// method table. `start` walks the graph from its start node: each step
/// dispatches the current node to its handler and moves to the id the
/// handler returns, until the terminal sentinel. Handlers call back into the
/// controller for I/O, value resolution, and condition evaluation.
pub struct DialogController {
    dialog: Arc<Dialog>,
    registry: NodeRegistry,
    methods: MethodTable,
    io: Arc<dyn DialogIo>,
    config: EngineConfig,
    event_bus: Option<Arc<EventBus>>,
    cancel: CancellationToken,
    run_id: RunId,
}

impl DialogController {
    /// Create a controller with every built-in node type registered.
    pub fn new(dialog: impl Into<Arc<Dialog>>, io: Arc<dyn DialogIo>) -> Self {
        Self {
            dialog: dialog.into(),
            registry: NodeRegistry::with_builtins(),
            methods: MethodTable::new(),
            io,
            config: EngineConfig::default(),
            event_bus: None,
            cancel: CancellationToken::new(),
            run_id: RunId::new(),
        }
    }

    /// Replace the node registry (e.g. to start from an empty one).
    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_methods(mut self, methods: MethodTable) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish run events to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Cancel input and delay waits when `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Register a host method. Replaces any method of the same name.
    pub fn register_method<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.methods.register(name, method);
    }

    /// Register a handler for an extension node type.
    pub fn register_node_handler(
        &mut self,
        node_type: impl Into<String>,
        handler: impl NodeHandler,
    ) -> Result<()> {
        self.registry.register(node_type, handler)
    }

    /// Run the dialog from its start node until it terminates.
    pub async fn start(&mut self) -> Result<RunOutcome> {
        self.run_id = RunId::new();
        let this: &Self = self;
        let run_id = this.run_id.clone();

        let started_at = Utc::now();
        let timer = Instant::now();
        let mut path = Vec::new();

        if let Err(e) = this.walk(&run_id, &mut path).await {
            error!(run_id = %run_id, node_id = ?path.last(), error = %e, "Dialog run failed");
            this.publish(RunEvent::RunFailed {
                run_id,
                error: e.to_string(),
            });
            return Err(e);
        }

        // Every node on the path was dispatched exactly once
        let steps = path.len();
        this.output(&this.config.termination_notice);
        info!(run_id = %run_id, steps, "Dialog run terminated");
        this.publish(RunEvent::RunTerminated {
            run_id: run_id.clone(),
            steps,
        });

        Ok(RunOutcome {
            run_id,
            path,
            steps,
            started_at,
            elapsed_ms: timer.elapsed().as_millis() as u64,
        })
    }

    /// Traverse from the start node, recording each visited id in `path`.
    async fn walk(&self, run_id: &RunId, path: &mut Vec<NodeId>) -> Result<()> {
        let mut current = self.dialog.start_node()?;
        info!(run_id = %run_id, start = current.id, "Starting dialog run");
        self.publish(RunEvent::RunStarted {
            run_id: run_id.clone(),
            start: current.id,
        });
        path.push(current.id);

        loop {
            debug!(node_id = current.id, node_type = %current.type_tag(), "Dispatching node");
            self.publish(RunEvent::NodeEntered {
                run_id: run_id.clone(),
                node_id: current.id,
                node_type: current.type_tag().to_string(),
            });

            let next = self.registry.dispatch(current, self).await?;
            match next {
                Some(id) if !ends_run(next) => {
                    current = self.dialog.get(id)?;
                    path.push(id);
                }
                _ => return Ok(()),
            }
        }
    }

    /// Resolve a value reference to a concrete value.
    ///
    /// Literals resolve immediately. A source reference invokes the referenced
    /// returning function node, whose own parameters may in turn reference
    /// further function nodes. Cycles among function parameters are not
    /// detected and recurse until the stack is exhausted.
    pub fn resolve_value<'a>(&'a self, value: &'a ValueRef) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            match value {
                ValueRef::Literal(v) => Ok(v.clone()),
                ValueRef::Source(id) => {
                    let node = self.dialog.get(*id)?;
                    match &node.kind {
                        NodeKind::Function(function) if function.return_type != ReturnType::Void => {
                            let resolved =
                                builtin::invoke_returning_function(self, node.id, function).await?;
                            debug!(node_id = node.id, value = %resolved, "Resolved deferred value");
                            Ok(resolved)
                        }
                        _ => Err(RavelError::InvalidValueSource(*id)),
                    }
                }
            }
        })
    }

    /// Evaluate a condition, resolving both operands first.
    pub async fn evaluate_condition(&self, condition: &Condition) -> Result<bool> {
        condition::evaluate(condition, self).await
    }

    /// Display a line.
    pub fn output(&self, text: &str) {
        self.io.output(text, true);
    }

    /// Display text without a trailing newline.
    pub fn output_inline(&self, text: &str) {
        self.io.output(text, false);
    }

    /// Wait for a line of input accepted by `validate`.
    pub async fn input(&self, prompt: &str, validate: &InputValidator) -> Result<String> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(RavelError::Cancelled),
            line = self.io.input(prompt, validate) => line,
        }
    }

    /// Suspend for `duration` without blocking the runtime.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                warn!(?duration, "Delay cancelled");
                Err(RavelError::Cancelled)
            }
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    pub fn publish(&self, event: RunEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Id of the current (or most recent) run.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}

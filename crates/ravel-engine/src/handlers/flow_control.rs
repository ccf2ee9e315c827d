use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use tracing::debug;

use ravel_core::error::{RavelError, Result};
use ravel_core::graph::{Node, NodeKind};
use ravel_core::traits::default_validate;
use ravel_core::types::NodeId;

use super::{parse_selection, unexpected_kind};
use crate::controller::DialogController;
use crate::handler::NodeHandler;

/// Presents numbered options and follows the one the player picks.
pub struct ChoiceHandler;

impl NodeHandler for ChoiceHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::Choice(choice) = &node.kind else {
                return Err(unexpected_kind(node, "choice"));
            };

            controller.output(&format!("Choice: {}", choice.prompt));
            for (i, option) in choice.choices.iter().enumerate() {
                controller.output(&format!("Option {}: {}", i + 1, option.text));
            }

            let count = choice.choices.len();
            let answer = controller
                .input(&format!("Chose an option (1-{}): ", count), &default_validate)
                .await?;
            let selection = parse_selection(&answer, 1, count)?;

            debug!(node_id = node.id, selection, "Choice made");
            Ok(Some(choice.choices[selection - 1].next))
        })
    }
}

pub struct IfHandler;

impl NodeHandler for IfHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::If(branch) = &node.kind else {
                return Err(unexpected_kind(node, "if"));
            };

            if controller.evaluate_condition(&branch.condition).await? {
                Ok(Some(branch.true_branch))
            } else {
                Ok(Some(branch.false_branch))
            }
        })
    }
}

/// Suspends the run for the node's length, in the configured delay unit.
pub struct DelayHandler;

impl NodeHandler for DelayHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::Delay(delay) = &node.kind else {
                return Err(unexpected_kind(node, "delay"));
            };

            let duration = controller
                .config()
                .delay_unit
                .duration(delay.length)
                .ok_or_else(|| RavelError::InvalidNode {
                    node: node.id,
                    node_type: node.type_tag().to_string(),
                    message: format!("invalid delay length {}", delay.length),
                })?;
            debug!(node_id = node.id, ?duration, "Delaying");
            controller.sleep(duration).await?;

            Ok(Some(delay.next))
        })
    }
}

/// Picks one branch uniformly at random.
pub struct RandomSelectorHandler;

impl NodeHandler for RandomSelectorHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        _controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        // Pick before boxing: the thread-local rng is not Send.
        let picked = match &node.kind {
            NodeKind::RandomSelector(selector) => selector
                .branches
                .choose(&mut rand::thread_rng())
                .copied()
                .map(Some)
                .ok_or(RavelError::EmptyBranchList(node.id)),
            _ => Err(unexpected_kind(node, "randomSelector")),
        };

        Box::pin(async move { picked })
    }
}

/// Follows the first case whose condition holds, else the default case.
pub struct SwitchHandler;

impl NodeHandler for SwitchHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let NodeKind::Switch(switch) = &node.kind else {
                return Err(unexpected_kind(node, "switch"));
            };

            for (i, case) in switch.cases.iter().enumerate() {
                if controller.evaluate_condition(&case.condition).await? {
                    debug!(node_id = node.id, case = i, "Switch case matched");
                    return Ok(Some(case.next));
                }
            }

            Ok(Some(switch.default_case))
        })
    }
}

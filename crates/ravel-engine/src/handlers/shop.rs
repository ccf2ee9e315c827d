//! Shop node — an extension node type.
//!
//! Not registered by default. Hosts opt in with [`register_shop_handler`],
//! choosing a [`ShopConfig`] policy: whether `0` exits the shop, and where
//! the run continues after buying an item that has no `next` of its own.

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use ravel_core::config::{AfterPurchase, ShopConfig};
use ravel_core::error::{RavelError, Result};
use ravel_core::graph::Node;
use ravel_core::traits::default_validate;
use ravel_core::types::{NodeId, RunEvent, Value};

use super::parse_selection;
use crate::controller::DialogController;
use crate::handler::NodeHandler;

/// Type tag of shop nodes.
pub const SHOP_NODE_TYPE: &str = "shop";

#[derive(Debug, Clone, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopNode {
    pub items: Vec<ShopItem>,
    pub next: NodeId,
}

pub struct ShopHandler {
    policy: ShopConfig,
}

impl ShopHandler {
    pub fn new(policy: ShopConfig) -> Self {
        Self { policy }
    }

    fn prompt(&self, count: usize) -> String {
        if self.policy.allow_exit {
            format!("Choose an item to purchase (1-{} and 0 to exit): ", count)
        } else {
            format!("Choose an item to purchase (1-{}): ", count)
        }
    }

    /// Hand the purchase to the host's purchase method, if one is configured.
    fn purchase(&self, controller: &DialogController, item: &ShopItem) -> Result<()> {
        let Some(name) = &self.policy.purchase_method else {
            return Ok(());
        };

        let method = controller
            .methods()
            .get(name)
            .ok_or_else(|| RavelError::UnknownMethod(name.clone()))?;

        controller.publish(RunEvent::MethodInvoked {
            run_id: controller.run_id().clone(),
            method: name.clone(),
        });
        method(&[Value::String(item.name.clone()), Value::Number(item.price)]);
        Ok(())
    }
}

impl NodeHandler for ShopHandler {
    fn handle<'a>(
        &'a self,
        node: &'a Node,
        controller: &'a DialogController,
    ) -> BoxFuture<'a, Result<Option<NodeId>>> {
        Box::pin(async move {
            let shop: ShopNode = node.decode_custom()?;

            controller.output("Welcome to the shop! Here are the available items:");
            for (i, item) in shop.items.iter().enumerate() {
                controller.output(&format!(
                    "Item {}: {} - {} (Price: {})",
                    i + 1,
                    item.name,
                    item.description,
                    Value::Number(item.price)
                ));
            }

            let min = if self.policy.allow_exit { 0 } else { 1 };
            let answer = controller
                .input(&self.prompt(shop.items.len()), &default_validate)
                .await?;
            let selection = parse_selection(&answer, min, shop.items.len())?;

            if selection == 0 {
                debug!(node_id = node.id, "Left shop without buying");
                return Ok(Some(shop.next));
            }

            let item = &shop.items[selection - 1];
            controller.output(&format!("You have selected {}.", item.name));
            self.purchase(controller, item)?;
            controller.output(&format!("You have been charged ${}", Value::Number(item.price)));
            info!(node_id = node.id, item = %item.name, price = item.price, "Shop purchase");

            let next = item.next.unwrap_or(match self.policy.after_purchase {
                AfterPurchase::Reprompt => node.id,
                AfterPurchase::Next => shop.next,
            });
            Ok(Some(next))
        })
    }
}

/// Register the shop handler on a controller under the `shop` type tag.
pub fn register_shop_handler(controller: &mut DialogController, policy: ShopConfig) -> Result<()> {
    controller.register_node_handler(SHOP_NODE_TYPE, ShopHandler::new(policy))
}

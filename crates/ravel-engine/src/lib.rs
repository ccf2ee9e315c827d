//! Dialog graph execution engine.
//!
//! The [`DialogController`] walks a [`Dialog`](ravel_core::Dialog) from its
//! start node, dispatching each node to the handler registered for its type
//! in a [`NodeRegistry`], until a handler returns the terminal sentinel.

pub mod condition;
pub mod console;
pub mod controller;
pub mod handler;
pub mod handlers;
pub mod registry;

pub use condition::compare;
pub use console::ConsoleIo;
pub use controller::DialogController;
pub use handler::{handler_fn, FnHandler, NodeHandler};
pub use handlers::shop::{register_shop_handler, ShopHandler, ShopItem, ShopNode};
pub use registry::NodeRegistry;

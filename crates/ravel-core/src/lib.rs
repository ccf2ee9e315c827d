pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod loader;
pub mod methods;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{RavelError, Result};
pub use event::EventBus;
pub use graph::{Dialog, Node, NodeKind};
pub use methods::{DialogMethod, MethodTable};
pub use traits::DialogIo;
pub use types::*;

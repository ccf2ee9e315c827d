use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::types::Value;

/// A host callable invoked by function nodes.
///
/// Receives the resolved parameters in declared order and returns a value,
/// or `None` for void methods.
pub type DialogMethod = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;

/// Named callables registered by the embedding application.
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, DialogMethod>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method. A method already registered under `name` is replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.methods.insert(name.clone(), Arc::new(method)).is_some() {
            warn!(method = %name, "Replacing previously registered dialog method");
        } else {
            debug!(method = %name, "Registered dialog method");
        }
    }

    /// Get a method by exact name.
    pub fn get(&self, name: &str) -> Option<DialogMethod> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// List all registered method names.
    pub fn list(&self) -> Vec<&str> {
        self.methods.keys().map(|s| s.as_str()).collect()
    }
}

impl std::fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.list();
        names.sort_unstable();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}

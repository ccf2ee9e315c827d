//! Test helpers: a scripted I/O adapter, recording host methods, and small
//! dialog fixtures.

pub mod fixtures;
pub mod io;

pub use fixtures::dialog;
pub use io::ScriptedIo;

use std::sync::{Arc, Mutex};

use ravel_core::types::Value;

/// Calls recorded by [`recording_method`], one parameter list per call.
pub type CallLog = Arc<Mutex<Vec<Vec<Value>>>>;

/// A host method that records its parameters and returns `result`.
pub fn recording_method(
    result: Option<Value>,
) -> (CallLog, impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let method = move |args: &[Value]| {
        sink.lock().unwrap().push(args.to_vec());
        result.clone()
    };
    (log, method)
}

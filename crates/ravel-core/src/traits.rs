use futures::future::BoxFuture;

use crate::error::Result;

/// Predicate deciding whether an input line is acceptable.
pub type InputValidator = dyn Fn(&str) -> bool + Send + Sync;

/// Default input validation: the line is non-empty after trimming.
pub fn default_validate(line: &str) -> bool {
    !line.trim().is_empty()
}

/// Validation that accepts every line, including empty ones.
pub fn accept_any(_line: &str) -> bool {
    true
}

/// Host I/O adapter — the only way a dialog run interacts with its user.
pub trait DialogIo: Send + Sync + 'static {
    /// Display text, optionally followed by a newline.
    fn output(&self, text: &str, newline: bool);

    /// Show `prompt`, then wait for the first line accepted by `validate`.
    ///
    /// Fails with `NoInput` when the input stream ends first.
    fn input<'a>(&'a self, prompt: &'a str, validate: &'a InputValidator)
        -> BoxFuture<'a, Result<String>>;
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use ravel_core::error::{RavelError, Result};
use ravel_core::traits::{DialogIo, InputValidator};

/// A [`DialogIo`] fed from a fixed list of input lines.
///
/// Every `output` call is recorded as one entry regardless of the newline
/// flag. Input skips lines the validator rejects, like a terminal would, and
/// fails with `NoInput` once the script runs out.
pub struct ScriptedIo {
    inputs: Mutex<VecDeque<String>>,
    outputs: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    pending: bool,
}

impl ScriptedIo {
    pub fn new<I, S>(inputs: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            inputs: Mutex::new(inputs.into_iter().map(Into::into).collect()),
            outputs: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            pending: false,
        })
    }

    /// An adapter whose input never arrives.
    pub fn pending() -> Arc<Self> {
        Arc::new(Self {
            inputs: Mutex::new(VecDeque::new()),
            outputs: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            pending: true,
        })
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().unwrap().clone()
    }

    /// Prompts passed to `input`, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn prompts_seen(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Input lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl DialogIo for ScriptedIo {
    fn output(&self, text: &str, _newline: bool) {
        self.outputs.lock().unwrap().push(text.to_string());
    }

    fn input<'a>(
        &'a self,
        prompt: &'a str,
        validate: &'a InputValidator,
    ) -> BoxFuture<'a, Result<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.pending {
            return Box::pin(futures::future::pending());
        }

        let mut inputs = self.inputs.lock().unwrap();
        let mut accepted = None;
        while let Some(line) = inputs.pop_front() {
            if validate(&line) {
                accepted = Some(line);
                break;
            }
        }
        drop(inputs);

        Box::pin(async move { accepted.ok_or(RavelError::NoInput) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ravel_core::traits::{accept_any, default_validate};

    #[tokio::test]
    async fn test_skips_rejected_lines() {
        let io = ScriptedIo::new(["", "  ", "go"]);
        assert_eq!(io.input("> ", &default_validate).await.unwrap(), "go");
        assert_eq!(io.prompts(), vec!["> "]);
        assert!(matches!(
            io.input("> ", &accept_any).await,
            Err(RavelError::NoInput)
        ));
    }

    #[test]
    fn test_records_outputs() {
        let io = ScriptedIo::new(Vec::<String>::new());
        io.output("Dialog: Hi", false);
        io.output("Choice: Go?", true);
        assert_eq!(io.outputs(), vec!["Dialog: Hi", "Choice: Go?"]);
    }
}

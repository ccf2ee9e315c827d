use std::io::Write;

use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use ravel_core::error::{RavelError, Result};
use ravel_core::traits::{DialogIo, InputValidator};

/// Terminal I/O: writes to stdout, reads lines from stdin.
pub struct ConsoleIo {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleIo {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleIo {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogIo for ConsoleIo {
    fn output(&self, text: &str, newline: bool) {
        let mut stdout = std::io::stdout().lock();
        let _ = if newline {
            writeln!(stdout, "{}", text)
        } else {
            write!(stdout, "{}", text)
        };
        let _ = stdout.flush();
    }

    fn input<'a>(
        &'a self,
        prompt: &'a str,
        validate: &'a InputValidator,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if !prompt.is_empty() {
                self.output(prompt, false);
            }

            let mut lines = self.lines.lock().await;
            while let Some(line) = lines.next_line().await? {
                if validate(&line) {
                    return Ok(line);
                }
            }

            Err(RavelError::NoInput)
        })
    }
}

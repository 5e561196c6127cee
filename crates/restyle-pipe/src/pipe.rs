use crate::shell::{run_piped, ShellError};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),
}

/// Something that transforms text, such as a CSS minifier.
pub trait PipeTarget {
    /// Feeds `input` to the target and returns what it produced.
    fn pipe(&self, input: &str) -> Result<String, PipeError>;
}

/// A shell command used as a filter: input on stdin, result read from stdout.
#[derive(Debug, Clone)]
pub struct CommandFilter {
    command: String,
    timeout: Option<Duration>,
}

impl CommandFilter {
    /// Creates a filter with no timeout.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
        }
    }

    /// Kills the command if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl PipeTarget for CommandFilter {
    fn pipe(&self, input: &str) -> Result<String, PipeError> {
        Ok(run_piped(&self.command, input, self.timeout)?)
    }
}

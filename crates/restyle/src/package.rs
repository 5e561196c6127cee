//! Packaging of the usercss build.
//!
//! Packaging is owned by an external tool; the builder only hands it the
//! path of the wrapped userstyle file.

use std::path::Path;

use restyle_pipe::{run_command, ShellError};

/// Errors raised by a packager.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("packager `{command}` failed: {source}")]
    Command {
        command: String,
        #[source]
        source: ShellError,
    },

    #[error("{0}")]
    Other(String),
}

/// Turns the usercss build file into a distributable package.
pub trait Packager {
    fn package(&self, build_file: &Path) -> Result<(), PackageError>;
}

/// Runs `<command> <build file>` through the shell.
#[derive(Debug, Clone)]
pub struct CommandPackager {
    command: String,
}

impl CommandPackager {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command_line(&self, build_file: &Path) -> String {
        let path = build_file.display().to_string();
        format!("{} '{}'", self.command, path.replace('\'', r"'\''"))
    }
}

impl Packager for CommandPackager {
    fn package(&self, build_file: &Path) -> Result<(), PackageError> {
        let command = self.command_line(build_file);
        run_command(&command, None).map_err(|source| PackageError::Command { command, source })
    }
}

/// Used when no packager is configured: logs and leaves the build file as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipPackager;

impl Packager for SkipPackager {
    fn package(&self, build_file: &Path) -> Result<(), PackageError> {
        log::warn!(
            "no packager configured; leaving {} unpackaged",
            build_file.display()
        );
        Ok(())
    }
}

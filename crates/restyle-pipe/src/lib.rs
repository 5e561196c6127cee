//! Shell command plumbing for the `restyle` stylesheet builder.
//!
//! External tools (the CSS minifier, the userstyle packager) run through the
//! platform shell. [`run_piped`] feeds text on stdin and captures stdout;
//! [`run_command`] runs a command for its side effects.

pub mod pipe;
pub mod shell;

pub use pipe::{CommandFilter, PipeError, PipeTarget};
pub use shell::{run_command, run_piped, ShellError};

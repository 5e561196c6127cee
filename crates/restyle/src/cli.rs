//! Command line entry point.

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::config;
use crate::minify::CommandMinifier;
use crate::package::{CommandPackager, Packager, SkipPackager};
use crate::pipeline::{BuildMode, BuildReport, Pipeline, Project};

/// Build a customized dark GitHub stylesheet from `github-dark.css`.
///
/// Options are read from `defaults.json` and `build.json` in the current
/// directory.
#[derive(Debug, Parser)]
#[command(name = "restyle", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Build the unminified stylesheet (default)
    Full,
    /// Build the minified stylesheet
    Min,
    /// Build the portable userstyle and package it
    Usercss,
    /// Regenerate minified theme files from themes/src
    Themes,
}

impl Command {
    pub fn mode(self) -> BuildMode {
        match self {
            Command::Full => BuildMode::Full,
            Command::Min => BuildMode::Min,
            Command::Usercss => BuildMode::UserCss,
            Command::Themes => BuildMode::Themes,
        }
    }
}

impl Cli {
    pub fn mode(&self) -> BuildMode {
        self.command.map(Command::mode).unwrap_or(BuildMode::Full)
    }
}

/// Runs the selected build in `root` with the configured external tools.
pub fn run(cli: &Cli, root: &Path) -> anyhow::Result<BuildReport> {
    let files = config::load(root)?;
    let effective = files.resolve();

    let minifier = CommandMinifier::new(effective.minifier.clone());
    let packager: Box<dyn Packager> = match effective.packager.as_deref() {
        Some(command) if !command.trim().is_empty() => Box::new(CommandPackager::new(command)),
        _ => Box::new(SkipPackager),
    };

    let pipeline = Pipeline::new(Project::new(root), &minifier, packager.as_ref());
    let report = pipeline.run(cli.mode(), &files)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_full() {
        let cli = Cli::try_parse_from(["restyle"]).unwrap();
        assert_eq!(cli.mode(), BuildMode::Full);
    }

    #[test]
    fn test_subcommands() {
        for (arg, mode) in [
            ("full", BuildMode::Full),
            ("min", BuildMode::Min),
            ("usercss", BuildMode::UserCss),
            ("themes", BuildMode::Themes),
        ] {
            let cli = Cli::try_parse_from(["restyle", arg]).unwrap();
            assert_eq!(cli.mode(), mode);
        }
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["restyle", "deploy"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_without_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["restyle", "min"]).unwrap();
        let err = run(&cli, dir.path()).unwrap_err();
        assert!(err.to_string().contains("base template not found"));
    }
}

//! CSS minification through an external tool.
//!
//! The pipeline only knows the [`Minifier`] trait. [`CommandMinifier`]
//! implements it by piping CSS through a `clean-css` compatible command;
//! tests use closures instead.

use restyle_pipe::{CommandFilter, PipeError, PipeTarget};

use crate::theme::ThemeSlot;

/// Errors raised by a minifier.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    /// The external command failed or could not be started.
    #[error("minifier `{command}` failed: {source}")]
    Command {
        command: String,
        #[source]
        source: PipeError,
    },

    /// The minifier produced no output for non-empty input.
    #[error("minifier `{0}` produced no output")]
    EmptyOutput(String),

    /// Any other failure, mostly from in-process minifiers.
    #[error("{0}")]
    Other(String),
}

/// Level-2 (structural) optimizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restructure {
    /// Only level-1 (per-property) optimizations.
    Off,
    /// Every structural optimization.
    Full,
    /// Structural optimizations off, except the listed merges.
    Selective {
        merge_media: bool,
        remove_duplicate_media_blocks: bool,
        remove_duplicate_rules: bool,
    },
}

/// How aggressively to minify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Keep `/*! ... */` comments.
    pub keep_special_comments: bool,
    /// Drop rules with no declarations.
    pub remove_empty: bool,
    /// Rewrite relative `url()`s.
    pub rebase: bool,
    pub restructure: Restructure,
}

impl MinifyOptions {
    /// Options for the generated stylesheet.
    ///
    /// Empty rules are kept and only media/duplicate merging runs, so the
    /// userstyle's rule order survives.
    pub fn build_file() -> Self {
        Self {
            keep_special_comments: true,
            remove_empty: false,
            rebase: false,
            restructure: Restructure::Selective {
                merge_media: true,
                remove_duplicate_media_blocks: true,
                remove_duplicate_rules: true,
            },
        }
    }

    /// Options for one theme family's source files.
    pub fn theme(slot: ThemeSlot) -> Self {
        match slot {
            // Structural optimizations would move the background rule,
            // which must stay first.
            ThemeSlot::Github => Self {
                keep_special_comments: true,
                remove_empty: true,
                rebase: false,
                restructure: Restructure::Off,
            },
            ThemeSlot::CodeMirror | ThemeSlot::Jupyter => Self {
                keep_special_comments: true,
                remove_empty: true,
                rebase: false,
                restructure: Restructure::Full,
            },
        }
    }

    /// `clean-css` command line arguments for these options.
    pub fn cleancss_args(&self) -> Vec<String> {
        let mut level1 = Vec::new();
        level1.push(format!(
            "specialComments:{}",
            if self.keep_special_comments { "all" } else { "0" }
        ));
        if !self.remove_empty {
            level1.push("removeEmpty:off".to_string());
        }

        let mut args = vec!["-O1".to_string(), quote(&level1.join(";"))];

        match self.restructure {
            Restructure::Off => {}
            Restructure::Full => {
                args.push("-O2".to_string());
                args.push(quote("all:on"));
            }
            Restructure::Selective {
                merge_media,
                remove_duplicate_media_blocks,
                remove_duplicate_rules,
            } => {
                let flag = |on: bool| if on { "on" } else { "off" };
                let level2 = [
                    "all:off".to_string(),
                    format!("mergeMedia:{}", flag(merge_media)),
                    format!(
                        "removeDuplicateMediaBlocks:{}",
                        flag(remove_duplicate_media_blocks)
                    ),
                    format!("removeDuplicateRules:{}", flag(remove_duplicate_rules)),
                ];
                args.push("-O2".to_string());
                args.push(quote(&level2.join(";")));
            }
        }

        if self.rebase {
            args.push("--with-rebase".to_string());
        }
        args
    }
}

fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Turns CSS text into minified CSS text.
pub trait Minifier {
    fn minify(&self, css: &str, options: &MinifyOptions) -> Result<String, MinifyError>;
}

impl<F> Minifier for F
where
    F: Fn(&str, &MinifyOptions) -> Result<String, MinifyError>,
{
    fn minify(&self, css: &str, options: &MinifyOptions) -> Result<String, MinifyError> {
        self(css, options)
    }
}

/// Runs a `clean-css` compatible program, CSS on stdin, result on stdout.
#[derive(Debug, Clone)]
pub struct CommandMinifier {
    program: String,
}

impl CommandMinifier {
    /// `program` is a shell command prefix such as `cleancss` or `npx cleancss`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The full shell command used for `options`.
    pub fn command_line(&self, options: &MinifyOptions) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(options.cleancss_args());
        parts.join(" ")
    }
}

impl Minifier for CommandMinifier {
    fn minify(&self, css: &str, options: &MinifyOptions) -> Result<String, MinifyError> {
        let command = self.command_line(options);
        let output = CommandFilter::new(command.clone())
            .pipe(css)
            .map_err(|source| MinifyError::Command {
                command: command.clone(),
                source,
            })?;

        if output.trim().is_empty() && !css.trim().is_empty() {
            return Err(MinifyError::EmptyOutput(command));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_file_args() {
        let args = MinifyOptions::build_file().cleancss_args();
        assert_eq!(
            args,
            vec![
                "-O1",
                "'specialComments:all;removeEmpty:off'",
                "-O2",
                "'all:off;mergeMedia:on;removeDuplicateMediaBlocks:on;removeDuplicateRules:on'",
            ]
        );
    }

    #[test]
    fn test_theme_args() {
        assert_eq!(
            MinifyOptions::theme(ThemeSlot::Github).cleancss_args(),
            vec!["-O1", "'specialComments:all'"]
        );
        assert_eq!(
            MinifyOptions::theme(ThemeSlot::Jupyter).cleancss_args(),
            vec!["-O1", "'specialComments:all'", "-O2", "'all:on'"]
        );
    }

    #[test]
    fn test_command_line() {
        let minifier = CommandMinifier::new("npx cleancss");
        assert_eq!(
            minifier.command_line(&MinifyOptions::theme(ThemeSlot::Github)),
            "npx cleancss -O1 'specialComments:all'"
        );
    }

    #[test]
    fn test_closure_minifier() {
        let strip = |css: &str, _: &MinifyOptions| -> Result<String, MinifyError> {
            Ok(css.split_whitespace().collect())
        };
        assert_eq!(
            strip.minify("a { b: c }", &MinifyOptions::build_file()).unwrap(),
            "a{b:c}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_minifier_runs_program() {
        // The trailing `true` swallows the clean-css arguments.
        let minifier = CommandMinifier::new("cat >/dev/null; printf 'a{b:c}'; true");
        let out = minifier
            .minify("a { b: c }", &MinifyOptions::build_file())
            .unwrap();
        assert_eq!(out, "a{b:c}");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_minifier_failure() {
        let minifier = CommandMinifier::new("false");
        let err = minifier
            .minify("a{}", &MinifyOptions::build_file())
            .unwrap_err();
        assert!(matches!(err, MinifyError::Command { .. }));
        assert!(err.to_string().contains("false"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_minifier_empty_output() {
        let minifier = CommandMinifier::new("cat >/dev/null; true");
        let err = minifier
            .minify("a{}", &MinifyOptions::build_file())
            .unwrap_err();
        assert!(matches!(err, MinifyError::EmptyOutput(_)));
    }
}

//! # Restyle - Dark Stylesheet Builder
//!
//! `restyle` turns a placeholder-annotated base stylesheet into customized
//! dark-mode stylesheets for GitHub.
//!
//! ## Core Concepts
//!
//! - [`Config`]: flat options from `defaults.json` overlaid by `build.json`
//! - [`BuildDescriptor`]: every derived value of one build plus its ordered [`Rule`]s
//! - [`apply`]: ordered placeholder substitution over the template
//! - [`ThemeSource`]: where the three embedded syntax themes are read from
//! - [`Pipeline`]: the `full`, `min`, `usercss` and `themes` build modes
//! - [`Minifier`] / [`Packager`]: external tools, injected into the pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use restyle::{config, BuildMode, CommandMinifier, Pipeline, Project, SkipPackager};
//!
//! # fn main() -> restyle::Result<()> {
//! let root = Path::new(".");
//! let files = config::load(root)?;
//! let minifier = CommandMinifier::new("cleancss");
//! let pipeline = Pipeline::new(Project::new(root), &minifier, &SkipPackager);
//! let report = pipeline.run(BuildMode::Min, &files)?;
//! println!("{:?}", report.outputs);
//! # Ok(())
//! # }
//! ```
//!
//! ## Placeholders
//!
//! Placeholders are CSS comments, `/*[[name]]*/`, usually followed by a
//! default value the rule replaces along with the token. See
//! [`descriptor`] for the full rule table.

pub mod cli;
pub mod color;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fsutil;
pub mod migrate;
pub mod minify;
pub mod package;
pub mod pipeline;
pub mod template;
pub mod theme;

pub use color::hex_to_rgb;
pub use config::{Config, ConfigFiles};
pub use descriptor::{BuildDescriptor, RuleSet};
pub use error::{BuildError, Result};
pub use migrate::{migrate, migrate_dir};
pub use minify::{CommandMinifier, Minifier, MinifyError, MinifyOptions, Restructure};
pub use package::{CommandPackager, PackageError, Packager, SkipPackager};
pub use pipeline::{BuildMode, BuildReport, Pipeline, Project, Stage};
pub use template::{apply, Matcher, Rule};
pub use theme::{ResolvedThemes, ThemeDir, ThemeSlot, ThemeSource};

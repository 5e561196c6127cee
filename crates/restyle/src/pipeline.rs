//! Build modes and their stage sequences.
//!
//! | Mode | Stages |
//! |------|--------|
//! | [`BuildMode::Full`] | substitute → wrap (unless Chrome/WebKit) |
//! | [`BuildMode::Min`] | substitute → minify → wrap (unless Chrome/WebKit) |
//! | [`BuildMode::UserCss`] | substitute (portable rules) → wrap → package |
//! | [`BuildMode::Themes`] | clean → minify each theme family → migrate Jupyter themes |
//!
//! Stages run strictly in order and the first failure aborts the rest.
//! Stylesheet text is carried between stages in memory and written once, to
//! a temporary file renamed over the artifact, so a failed stage never leaves
//! a half-built stylesheet behind.

use std::path::{Path, PathBuf};

use crate::config::ConfigFiles;
use crate::descriptor::BuildDescriptor;
use crate::error::{BuildError, Result};
use crate::fsutil::{list_files, read, read_optional, remove_recursive, write_atomic};
use crate::migrate::migrate_dir;
use crate::minify::{Minifier, MinifyOptions};
use crate::package::Packager;
use crate::template::apply;
use crate::theme::{ThemeDir, ThemeSlot, MIN_EXT};

/// Base stylesheet template, relative to the project root.
pub const TEMPLATE_FILE: &str = "github-dark.css";

/// Theme directory, relative to the project root.
pub const THEMES_DIR: &str = "themes";

/// What to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Unminified consumer stylesheet.
    Full,
    /// Minified consumer stylesheet.
    Min,
    /// Portable userstyle with user-adjustable placeholders.
    UserCss,
    /// Regenerate minified theme files from their sources.
    Themes,
}

impl BuildMode {
    pub fn name(self) -> &'static str {
        match self {
            BuildMode::Full => "full",
            BuildMode::Min => "min",
            BuildMode::UserCss => "usercss",
            BuildMode::Themes => "themes",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A completed pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Substitute,
    Minify,
    Wrap,
    Package,
    Clean,
    MinifyThemes(ThemeSlot),
    Migrate,
}

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Stages that ran, in order.
    pub stages: Vec<Stage>,
    /// Files written.
    pub outputs: Vec<PathBuf>,
    /// Files deleted by the clean stage.
    pub removed: Vec<PathBuf>,
}

/// Well-known paths inside a stylesheet project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(TEMPLATE_FILE)
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(THEMES_DIR)
    }

    /// `themes/src/<family>/`
    pub fn theme_source_dir(&self, slot: ThemeSlot) -> PathBuf {
        self.themes_dir().join("src").join(slot.family())
    }

    /// `themes/<family>/`
    pub fn theme_output_dir(&self, slot: ThemeSlot) -> PathBuf {
        self.themes_dir().join(slot.family())
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Reads the base template; its absence is fatal.
    pub fn load_template(&self) -> Result<String> {
        let path = self.template_path();
        read_optional(&path)?.ok_or(BuildError::MissingTemplate { path })
    }
}

/// Prepends the engine prefix line to a stylesheet.
///
/// The closing brace is not added back: the template's own closing brace is
/// removed with the default theme region, and an unclosed block at the end
/// of a stylesheet is closed implicitly.
pub fn wrap_with_prefix(prefix: &str, css: &str) -> String {
    format!("{}\n{}\n", prefix, css)
}

/// Runs build modes against a project with injected collaborators.
pub struct Pipeline<'a> {
    project: Project,
    minifier: &'a dyn Minifier,
    packager: &'a dyn Packager,
}

impl<'a> Pipeline<'a> {
    pub fn new(project: Project, minifier: &'a dyn Minifier, packager: &'a dyn Packager) -> Self {
        Self {
            project,
            minifier,
            packager,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Runs every stage of `mode`.
    pub fn run(&self, mode: BuildMode, config: &ConfigFiles) -> Result<BuildReport> {
        log::info!("running {} build in {}", mode, self.project.root().display());
        match mode {
            BuildMode::Themes => self.rebuild_themes(),
            BuildMode::Full | BuildMode::Min | BuildMode::UserCss => {
                self.build_stylesheet(mode, config)
            }
        }
    }

    fn build_stylesheet(&self, mode: BuildMode, config: &ConfigFiles) -> Result<BuildReport> {
        let template = self.project.load_template()?;
        let themes = ThemeDir::new(self.project.themes_dir());
        let assembled =
            BuildDescriptor::assemble(&config.base, &config.overrides, &template, &themes)?;

        let descriptor = match mode {
            BuildMode::Full => assembled.for_full(),
            BuildMode::UserCss => assembled.for_usercss(),
            _ => assembled,
        };

        let mut report = BuildReport::default();

        log::info!("substituting placeholders for {}", descriptor.file_name());
        let mut css = apply(&template, descriptor.rules());
        report.stages.push(Stage::Substitute);

        if mode == BuildMode::Min {
            log::info!("minifying {}", descriptor.file_name());
            css = self.minifier.minify(&css, &MinifyOptions::build_file())?;
            report.stages.push(Stage::Minify);
        }

        let wrap = match mode {
            BuildMode::UserCss => true,
            _ => descriptor.wraps_consumer_build(),
        };
        if wrap {
            log::info!("wrapping {} in engine prefix", descriptor.file_name());
            css = wrap_with_prefix(descriptor.prefix(), &css);
            report.stages.push(Stage::Wrap);
        } else {
            log::debug!("engine prefix skipped for Chrome/WebKit target");
        }

        let output = self.project.output_path(descriptor.file_name());
        write_atomic(&output, &css)?;
        log::info!("wrote {}", output.display());
        report.outputs.push(output.clone());

        if mode == BuildMode::UserCss {
            log::info!("packaging {}", output.display());
            self.packager.package(&output)?;
            report.stages.push(Stage::Package);
        }

        Ok(report)
    }

    fn rebuild_themes(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        let themes_dir = self.project.themes_dir();

        report.removed = remove_recursive(&themes_dir, MIN_EXT)?;
        log::info!("removed {} minified theme file(s)", report.removed.len());
        report.stages.push(Stage::Clean);

        for slot in ThemeSlot::ALL {
            let source_dir = self.project.theme_source_dir(slot);
            let output_dir = self.project.theme_output_dir(slot);
            let options = MinifyOptions::theme(slot);

            let sources = list_files(&source_dir, Some(".css"))?;
            if sources.is_empty() {
                log::warn!("no {} theme sources in {}", slot, source_dir.display());
            }

            for source in sources {
                let Some(stem) = source
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_suffix(".css"))
                else {
                    continue;
                };
                let dest = output_dir.join(format!("{}{}", stem, MIN_EXT));
                log::debug!("minifying {} -> {}", source.display(), dest.display());

                let css = read(&source)?;
                let minified = self.minifier.minify(&css, &options)?;
                write_atomic(&dest, &minified)?;
                report.outputs.push(dest);
            }
            log::info!("minified {} themes", slot);
            report.stages.push(Stage::MinifyThemes(slot));
        }

        let jupyter = self.project.theme_output_dir(ThemeSlot::Jupyter);
        let changed = migrate_dir(&jupyter)?;
        log::info!("migrated selector groups in {} jupyter theme(s)", changed);
        report.stages.push(Stage::Migrate);

        Ok(report)
    }
}

//! Syntax theme resolution.
//!
//! The generated stylesheet embeds three independently chosen syntax themes,
//! one per [`ThemeSlot`]. Each slot reads minified theme files from its own
//! folder under `themes/`:
//!
//! | Slot | Folder | Source folder |
//! |------|--------|---------------|
//! | [`ThemeSlot::Github`] | `themes/github/` | `themes/src/github/` |
//! | [`ThemeSlot::CodeMirror`] | `themes/codemirror/` | `themes/src/codemirror/` |
//! | [`ThemeSlot::Jupyter`] | `themes/jupyter/` | `themes/src/jupyter/` |
//!
//! # Resolution
//!
//! 1. The requested name is normalized: an empty name becomes the slot's
//!    default (`twilight`), otherwise it is lowercased and every whitespace
//!    run becomes a single hyphen (`"Tomorrow Night"` → `"tomorrow-night"`).
//! 2. `themes/<folder><name>.min.css` is read if it exists.
//! 3. Otherwise the slot's default file is read. Its absence is fatal.
//!
//! Lookups go through [`ThemeSource`], so resolution can be tested against an
//! in-memory map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BuildError, Result};
use crate::fsutil::read_optional;

/// Name used when no theme is requested, and when the requested file is missing.
pub const DEFAULT_THEME: &str = "twilight";

/// Extension of generated theme files.
pub const MIN_EXT: &str = ".min.css";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalizes a theme name for use in file names.
pub fn normalize_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => WHITESPACE
            .replace_all(&name.to_lowercase(), "-")
            .into_owned(),
        _ => DEFAULT_THEME.to_string(),
    }
}

/// One of the three embedded syntax themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    /// Syntax highlighting for GitHub code views.
    Github,
    /// Embedded CodeMirror editors.
    CodeMirror,
    /// Rendered Jupyter notebooks.
    Jupyter,
}

impl ThemeSlot {
    /// All slots, in the order their source folders are minified.
    pub const ALL: [ThemeSlot; 3] = [
        ThemeSlot::CodeMirror,
        ThemeSlot::Github,
        ThemeSlot::Jupyter,
    ];

    /// Family directory name under `themes/` and `themes/src/`.
    pub fn family(self) -> &'static str {
        match self {
            ThemeSlot::Github => "github",
            ThemeSlot::CodeMirror => "codemirror",
            ThemeSlot::Jupyter => "jupyter",
        }
    }

    /// Folder prefix relative to `themes/`, with trailing slash.
    pub fn folder(self) -> String {
        format!("{}/", self.family())
    }

    pub fn default_name(self) -> &'static str {
        DEFAULT_THEME
    }
}

impl std::fmt::Display for ThemeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.family())
    }
}

/// Read access to minified theme files, keyed by path relative to `themes/`.
pub trait ThemeSource {
    /// Returns the file's content, or `None` if it does not exist.
    fn read(&self, relative: &str) -> Result<Option<String>>;

    /// Location used in error messages.
    fn locate(&self, relative: &str) -> PathBuf {
        PathBuf::from(relative)
    }
}

/// Theme files on disk.
#[derive(Debug, Clone)]
pub struct ThemeDir {
    root: PathBuf,
}

impl ThemeDir {
    /// Creates a source rooted at the project's `themes/` directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ThemeSource for ThemeDir {
    fn read(&self, relative: &str) -> Result<Option<String>> {
        read_optional(&self.root.join(relative))
    }

    fn locate(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

impl ThemeSource for HashMap<String, String> {
    fn read(&self, relative: &str) -> Result<Option<String>> {
        Ok(self.get(relative).cloned())
    }
}

/// Resolves `name` in `folder`, falling back to `default_name`.
pub fn resolve<S: ThemeSource + ?Sized>(
    source: &S,
    name: Option<&str>,
    folder: &str,
    default_name: &str,
) -> Result<String> {
    let normalized = normalize_name(name);
    let requested = format!("{}{}{}", folder, normalized, MIN_EXT);
    if let Some(content) = source.read(&requested)? {
        log::debug!("using theme {}", requested);
        return Ok(content);
    }

    let fallback = format!("{}{}{}", folder, default_name, MIN_EXT);
    if normalized != default_name {
        log::warn!("theme {} not found, falling back to {}", requested, fallback);
    }
    source
        .read(&fallback)?
        .ok_or_else(|| BuildError::MissingDefaultTheme {
            path: source.locate(&fallback),
        })
}

/// Resolves a slot's theme by name.
pub fn resolve_slot<S: ThemeSource + ?Sized>(
    source: &S,
    name: Option<&str>,
    slot: ThemeSlot,
) -> Result<String> {
    resolve(source, name, &slot.folder(), slot.default_name())
}

/// Contents of all three theme slots for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedThemes {
    pub main: String,
    pub codemirror: String,
    pub jupyter: String,
}

impl ResolvedThemes {
    /// Resolves every slot once.
    pub fn resolve<S: ThemeSource + ?Sized>(
        source: &S,
        main: Option<&str>,
        codemirror: Option<&str>,
        jupyter: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            main: resolve_slot(source, main, ThemeSlot::Github)?,
            codemirror: resolve_slot(source, codemirror, ThemeSlot::CodeMirror)?,
            jupyter: resolve_slot(source, jupyter, ThemeSlot::Jupyter)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HashMap<String, String> {
        let mut files = HashMap::new();
        files.insert("github/twilight.min.css".to_string(), "gh-twilight".to_string());
        files.insert("github/twi-light.min.css".to_string(), "gh-twi-light".to_string());
        files.insert(
            "github/tomorrow-night.min.css".to_string(),
            "gh-tomorrow-night".to_string(),
        );
        files.insert("jupyter/twilight.min.css".to_string(), "jp-twilight".to_string());
        files
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(None), "twilight");
        assert_eq!(normalize_name(Some("")), "twilight");
        assert_eq!(normalize_name(Some("Twilight")), "twilight");
        assert_eq!(normalize_name(Some("twi light")), "twi-light");
        assert_eq!(normalize_name(Some("Tomorrow \t Night")), "tomorrow-night");
    }

    #[test]
    fn test_absent_name_equals_default() {
        let files = source();
        let absent = resolve_slot(&files, None, ThemeSlot::Github).unwrap();
        let named = resolve_slot(&files, Some("Twilight"), ThemeSlot::Github).unwrap();
        assert_eq!(absent, "gh-twilight");
        assert_eq!(absent, named);
    }

    #[test]
    fn test_whitespace_collapses_to_hyphen() {
        let files = source();
        assert_eq!(
            resolve_slot(&files, Some("twi light"), ThemeSlot::Github).unwrap(),
            "gh-twi-light"
        );
        assert_eq!(
            resolve_slot(&files, Some("Tomorrow  Night"), ThemeSlot::Github).unwrap(),
            "gh-tomorrow-night"
        );
    }

    #[test]
    fn test_missing_theme_falls_back() {
        let files = source();
        assert_eq!(
            resolve_slot(&files, Some("Nonexistent"), ThemeSlot::Github).unwrap(),
            resolve_slot(&files, Some("twilight"), ThemeSlot::Github).unwrap()
        );
    }

    #[test]
    fn test_missing_default_is_fatal() {
        let files = source();
        let err = resolve_slot(&files, Some("monokai"), ThemeSlot::CodeMirror).unwrap_err();
        match err {
            BuildError::MissingDefaultTheme { path } => {
                assert_eq!(path, PathBuf::from("codemirror/twilight.min.css"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_theme_dir_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("jupyter")).unwrap();
        std::fs::write(dir.path().join("jupyter/twilight.min.css"), ".jp{}").unwrap();

        let themes = ThemeDir::new(dir.path());
        assert_eq!(
            resolve_slot(&themes, Some("Solarized Dark"), ThemeSlot::Jupyter).unwrap(),
            ".jp{}"
        );
    }

    #[test]
    fn test_slot_folders() {
        assert_eq!(ThemeSlot::Github.folder(), "github/");
        assert_eq!(ThemeSlot::CodeMirror.folder(), "codemirror/");
        assert_eq!(ThemeSlot::Jupyter.to_string(), "jupyter");
    }
}

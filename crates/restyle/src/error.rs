//! Error types for the build pipeline.
//!
//! Every failure here is fatal for the current build: the pipeline aborts on
//! the first error and nothing is promoted to the final artifact path.
//! Missing placeholders are not errors (see
//! [`crate::template::apply`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::minify::MinifyError;
use crate::package::PackageError;

/// Errors that can abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The base stylesheet template could not be found.
    #[error("base template not found: {}", path.display())]
    MissingTemplate { path: PathBuf },

    /// A theme slot's fallback file is missing.
    #[error("default theme file missing: {}", path.display())]
    MissingDefaultTheme { path: PathBuf },

    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file exists but could not be parsed.
    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A token that is replaced only once appears several times in the template.
    #[error("placeholder {token} appears {count} times in the template; expected at most once")]
    DuplicateToken { token: String, count: usize },

    /// The external minifier failed.
    #[error(transparent)]
    Minify(#[from] MinifyError),

    /// The external packager failed.
    #[error(transparent)]
    Package(#[from] PackageError),
}

impl BuildError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

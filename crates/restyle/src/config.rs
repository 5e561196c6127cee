//! Build configuration.
//!
//! Configuration is a flat JSON object. Built-in defaults are overlaid by an
//! optional `defaults.json`, and user choices come from an optional
//! `build.json`. Every overlay is shallow: a key in the overlay replaces the
//! key in the base, nothing is deep-merged.
//!
//! Malformed user input never aborts a build. A key whose value has the
//! wrong JSON type, or a key the builder does not know, is dropped with a
//! warning and the base value stays in effect. Numbers are accepted for
//! string options so `"tab": 4` works the same as `"tab": "4"`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BuildError, Result};
use crate::fsutil::read_optional;

/// File holding project-wide defaults.
pub const DEFAULTS_FILE: &str = "defaults.json";

/// File holding the user's build choices.
pub const BUILD_FILE: &str = "build.json";

/// Fully resolved build options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Main syntax theme name, e.g. `"Twilight"` or `"Dimmed"`.
    pub theme: String,
    /// CodeMirror theme name.
    #[serde(rename = "themeCM")]
    pub theme_cm: String,
    /// Jupyter theme name.
    #[serde(rename = "themeJP")]
    pub theme_jp: String,
    /// Base accent color as a hex string.
    pub color: String,
    /// Background image, either a bare path/URL or a `url(...)` value.
    pub image: String,
    /// Tile the background instead of fitting it.
    pub tiled: bool,
    /// Background attachment; only `"scroll"` is meaningful, anything else is fixed.
    pub attach: String,
    /// Wrap long code lines.
    pub code_wrap: bool,
    /// Tab size, numeric string.
    pub tab: String,
    pub font: String,
    pub font_size: String,
    /// Target Chrome; skips the `@-moz-document` wrapper.
    pub chrome: bool,
    /// Target WebKit; skips the `@-moz-document` wrapper.
    pub webkit: bool,
    /// Shell command used to minify CSS read from stdin.
    pub minifier: String,
    /// Shell command that packages the usercss build; the build path is appended.
    pub packager: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Twilight".to_string(),
            theme_cm: "Twilight".to_string(),
            theme_jp: "Twilight".to_string(),
            color: "#4183C4".to_string(),
            image: "url(images/backgrounds/bg-tile1.png)".to_string(),
            tiled: true,
            attach: "scroll".to_string(),
            code_wrap: false,
            tab: "4".to_string(),
            font: String::new(),
            font_size: String::new(),
            chrome: false,
            webkit: false,
            minifier: "cleancss".to_string(),
            packager: None,
        }
    }
}

impl Config {
    /// Returns a new config with `overrides` applied key by key.
    ///
    /// Keys that are unknown or carry a value of the wrong type are ignored
    /// and logged at `warn`.
    pub fn merged(&self, overrides: &Map<String, Value>) -> Config {
        let mut fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return self.clone(),
        };

        for (key, value) in overrides {
            let Some(current) = fields.get(key) else {
                log::warn!("ignoring unknown option `{}`", key);
                continue;
            };
            match coerce(current, value) {
                Some(accepted) => {
                    fields.insert(key.clone(), accepted);
                }
                None => log::warn!(
                    "ignoring option `{}`: expected {}, got {}",
                    key,
                    kind(current),
                    kind(value)
                ),
            }
        }

        match serde_json::from_value(Value::Object(fields)) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("could not apply overrides ({}); using base options", e);
                self.clone()
            }
        }
    }
}

/// Converts `value` to the JSON type of `current`, if the two are compatible.
fn coerce(current: &Value, value: &Value) -> Option<Value> {
    match (current, value) {
        (Value::Bool(_), Value::Bool(_)) => Some(value.clone()),
        (Value::String(_), Value::String(_)) => Some(value.clone()),
        (Value::String(_), Value::Number(n)) => Some(Value::String(n.to_string())),
        (Value::String(_), Value::Null) => Some(Value::String(String::new())),
        // Optional string options: unset by default.
        (Value::Null, Value::String(_) | Value::Null) => Some(value.clone()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Base configuration plus the user's overrides, before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFiles {
    pub base: Config,
    pub overrides: Map<String, Value>,
}

impl ConfigFiles {
    /// Wraps an explicit base and override map.
    pub fn new(base: Config, overrides: Map<String, Value>) -> Self {
        Self { base, overrides }
    }

    /// The effective configuration.
    pub fn resolve(&self) -> Config {
        self.base.merged(&self.overrides)
    }
}

/// Loads `defaults.json` and `build.json` from the project root.
///
/// A malformed `defaults.json` is a project error and fails the build. A
/// missing or malformed `build.json` falls back to the defaults.
pub fn load(root: &Path) -> Result<ConfigFiles> {
    let defaults_path = root.join(DEFAULTS_FILE);
    let mut base = Config::default();
    if let Some(text) = read_optional(&defaults_path)? {
        let map = parse_object(&text).map_err(|message| BuildError::Config {
            path: defaults_path.clone(),
            message,
        })?;
        base = base.merged(&map);
    }
    // Engine targeting is a per-build choice, never a project default.
    base.webkit = false;

    let build_path = root.join(BUILD_FILE);
    let overrides = match read_optional(&build_path)? {
        Some(text) => match parse_object(&text) {
            Ok(map) => {
                log::debug!("loaded {} override(s) from {}", map.len(), build_path.display());
                map
            }
            Err(message) => {
                log::warn!("{} is invalid ({}); using defaults", BUILD_FILE, message);
                Map::new()
            }
        },
        None => {
            log::info!("{} not found - using defaults", BUILD_FILE);
            Map::new()
        }
    };

    Ok(ConfigFiles { base, overrides })
}

fn parse_object(text: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

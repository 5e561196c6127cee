//! Build descriptors: everything one build needs, computed up front.
//!
//! [`BuildDescriptor::assemble`] merges the configuration, derives every
//! value the template needs (file name, background block, attachment,
//! code-wrap CSS, engine prefix, theme contents) and builds the ordered rule
//! list. The descriptor is immutable; the `for_*` methods return new
//! descriptors for the other build variants.
//!
//! # Rule order
//!
//! | # | Placeholder | Consumer build | Portable build |
//! |---|-------------|----------------|----------------|
//! | 1 | `@-moz-document` line | removed | removed |
//! | 2 | `bg-choice` | image `url(...)` | bare token |
//! | 3 | `bg-options` | background block | background block |
//! | 4 | `bg-attachment` | `scroll` / `fixed` | bare token |
//! | 5 | `base-color` (all) | color | bare token |
//! | 6 | `base-color-rgb` (all) | `r, g, b` | `r, g, b` |
//! | 7 | `font-choice` | font | font |
//! | 8 | `font-size-choice` | font size | font size |
//! | 9 | `code-wrap` | wrap CSS or empty | wrap CSS or empty |
//! | 10 | `tab-size` (all) | tab size | bare token |
//! | 11 | default theme region | removed | removed |
//! | 12 | `syntax-theme` | main theme | main theme |
//! | 13 | `syntax-codemirror` | CodeMirror theme | CodeMirror theme |
//! | 14 | `syntax-jupyter` | Jupyter theme | Jupyter theme |

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::color::{hex_to_rgb, sanitize_for_filename};
use crate::config::Config;
use crate::error::Result;
use crate::template::{check_unique_tokens, token, Rule};
use crate::theme::{normalize_name, ResolvedThemes, ThemeSource};

/// Output name of the portable userstyle build.
pub const USERCSS_FILE: &str = "github-dark-userstyle.build.css";

const MIN_SUFFIX: &str = ".min.css";

/// Background block for tiled images.
pub const BG_TILED: &str = concat!(
    "\n",
    "    background-repeat: repeat !important;\n",
    "    background-size: auto !important;\n",
    "    background-position: left top !important;\n",
    "    ",
);

/// Background block for a single image fitted to the page.
pub const BG_FIT: &str = concat!(
    "\n",
    "    background-repeat: no-repeat !important;\n",
    "    background-size: cover !important;\n",
    "    background-position: center top !important;\n",
    "    ",
);

/// Extra rules injected when long code lines should wrap.
pub const CODE_WRAP_CSS: &str = concat!(
    "\n",
    "      /* GitHub: Enable wrapping of long code lines */\n",
    "      body:not(.nowrap) .blob-code-inner,\n",
    "      body:not(.nowrap) .markdown-body pre > code,\n",
    "      body:not(.nowrap) .markdown-body .highlight > pre {\n",
    "        white-space: pre-wrap !important;\n",
    "        word-break: break-all !important;\n",
    "        overflow-wrap: break-word !important;\n",
    "        display: block !important;\n",
    "      }\n",
    "      body:not(.nowrap) td.blob-code-inner {\n",
    "        display: table-cell !important;\n",
    "      }\n",
    "    ",
);

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid built-in pattern")
}

static ENGINE_PREFIX: Lazy<Regex> =
    Lazy::new(|| compile(r"(?m)^@-moz-document regexp\((.*)\) \{[\n\r]+"));
static BG_CHOICE: Lazy<Regex> = Lazy::new(|| compile(r"/\*\[\[bg-choice\]\]\*/ url\(.*\)"));
static BASE_COLOR: Lazy<Regex> =
    Lazy::new(|| compile(r"/\*\[\[base-color\]\]\*/ #[0-9A-Za-z_]{3,6}"));
static BASE_COLOR_RGB: Lazy<Regex> = Lazy::new(|| compile(r"/\*\[\[base-color-rgb\]\]\*/"));
static TAB_SIZE: Lazy<Regex> = Lazy::new(|| compile(r"/\*\[\[tab-size\]\]\*/ [0-9]+"));
// The region ends with the template's closing brace and the end marker.
static DEFAULT_THEMES: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?mR)\s+/\* grunt build - remove start[\s\S]+grunt build - remove end \*/$")
});

/// Which rule list a descriptor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// Every placeholder resolved, for direct installation.
    Consumer,
    /// User-adjustable placeholders kept, for userstyle managers.
    Portable,
}

/// Output file name for a consumer build.
pub fn build_file_name(config: &Config) -> String {
    format!(
        "github-dark-{}-{}.build{}",
        normalize_name(Some(&config.theme)),
        sanitize_for_filename(&config.color),
        MIN_SUFFIX
    )
}

/// Wraps a bare image path in `url("...")`.
pub fn normalize_image(image: &str) -> String {
    if image.starts_with("url") {
        image.to_string()
    } else {
        format!("url(\"{}\")", image)
    }
}

pub fn background_options(tiled: bool) -> &'static str {
    if tiled {
        BG_TILED
    } else {
        BG_FIT
    }
}

/// `"scroll"` if requested (any case), otherwise `"fixed"`.
pub fn background_attachment(attach: &str) -> &'static str {
    if attach.eq_ignore_ascii_case("scroll") {
        "scroll"
    } else {
        "fixed"
    }
}

pub fn code_wrap_css(enabled: bool) -> &'static str {
    if enabled {
        CODE_WRAP_CSS
    } else {
        ""
    }
}

/// Extracts the `@-moz-document regexp(...) {` line from the template.
///
/// Returns an empty string when the template has none.
pub fn extract_prefix(template: &str) -> String {
    ENGINE_PREFIX
        .find(template)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Everything needed to produce one stylesheet.
#[derive(Debug, Clone)]
pub struct BuildDescriptor {
    config: Config,
    file_name: String,
    image: String,
    bg_options: &'static str,
    bg_attachment: &'static str,
    code_wrap_css: &'static str,
    color_rgb: String,
    prefix: String,
    themes: ResolvedThemes,
    rule_set: RuleSet,
    rules: Vec<Rule>,
}

impl BuildDescriptor {
    /// Builds the consumer descriptor for a `.min.css` build.
    ///
    /// `overrides` are applied over `base` key by key before anything is
    /// derived. Fails if a theme slot's default file is missing or a
    /// single-use placeholder occurs more than once in `template`.
    pub fn assemble<S: ThemeSource + ?Sized>(
        base: &Config,
        overrides: &Map<String, Value>,
        template: &str,
        themes: &S,
    ) -> Result<Self> {
        let config = base.merged(overrides);

        let themes = ResolvedThemes::resolve(
            themes,
            Some(&config.theme),
            Some(&config.theme_cm),
            Some(&config.theme_jp),
        )?;

        let mut descriptor = Self {
            file_name: build_file_name(&config),
            image: normalize_image(&config.image),
            bg_options: background_options(config.tiled),
            bg_attachment: background_attachment(&config.attach),
            code_wrap_css: code_wrap_css(config.code_wrap),
            color_rgb: hex_to_rgb(&config.color),
            prefix: extract_prefix(template),
            themes,
            rule_set: RuleSet::Consumer,
            rules: Vec::new(),
            config,
        };
        descriptor.rules = descriptor.build_rules(RuleSet::Consumer);
        check_unique_tokens(template, &descriptor.rules)?;

        log::debug!(
            "assembled {} with {} rules",
            descriptor.file_name,
            descriptor.rules.len()
        );
        Ok(descriptor)
    }

    /// The unminified variant: same rules, `.css` instead of `.min.css`.
    pub fn for_full(&self) -> Self {
        let file_name = match self.file_name.strip_suffix(MIN_SUFFIX) {
            Some(stem) => format!("{}.css", stem),
            None => self.file_name.clone(),
        };
        Self {
            file_name,
            ..self.clone()
        }
    }

    /// The portable userstyle variant.
    pub fn for_usercss(&self) -> Self {
        Self {
            file_name: USERCSS_FILE.to_string(),
            rule_set: RuleSet::Portable,
            rules: self.build_rules(RuleSet::Portable),
            ..self.clone()
        }
    }

    fn build_rules(&self, set: RuleSet) -> Vec<Rule> {
        let portable = set == RuleSet::Portable;
        let keep = |name: &str, resolved: &str| -> String {
            if portable {
                token(name)
            } else {
                resolved.to_string()
            }
        };

        vec![
            Rule::pattern(&ENGINE_PREFIX, ""),
            Rule::pattern(&BG_CHOICE, keep("bg-choice", &self.image)).consumes("bg-choice"),
            Rule::literal(token("bg-options"), self.bg_options).consumes("bg-options"),
            Rule::literal(
                format!("{} fixed", token("bg-attachment")),
                keep("bg-attachment", self.bg_attachment),
            )
            .consumes("bg-attachment"),
            Rule::global(&BASE_COLOR, keep("base-color", &self.config.color))
                .consumes("base-color"),
            Rule::global(&BASE_COLOR_RGB, self.color_rgb.as_str()).consumes("base-color-rgb"),
            Rule::literal(token("font-choice"), self.config.font.as_str())
                .consumes("font-choice"),
            Rule::literal(token("font-size-choice"), self.config.font_size.as_str())
                .consumes("font-size-choice"),
            Rule::literal(token("code-wrap"), self.code_wrap_css).consumes("code-wrap"),
            Rule::global(&TAB_SIZE, keep("tab-size", &self.config.tab)).consumes("tab-size"),
            Rule::pattern(&DEFAULT_THEMES, ""),
            Rule::literal(token("syntax-theme"), self.themes.main.as_str())
                .consumes("syntax-theme"),
            Rule::literal(token("syntax-codemirror"), self.themes.codemirror.as_str())
                .consumes("syntax-codemirror"),
            Rule::literal(token("syntax-jupyter"), self.themes.jupyter.as_str())
                .consumes("syntax-jupyter"),
        ]
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn bg_options(&self) -> &str {
        self.bg_options
    }

    pub fn bg_attachment(&self) -> &str {
        self.bg_attachment
    }

    pub fn code_wrap_css(&self) -> &str {
        self.code_wrap_css
    }

    pub fn color_rgb(&self) -> &str {
        &self.color_rgb
    }

    /// The `@-moz-document` line, or empty if the template has none.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn themes(&self) -> &ResolvedThemes {
        &self.themes
    }

    pub fn rule_set(&self) -> RuleSet {
        self.rule_set
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether consumer builds get wrapped in the engine prefix.
    ///
    /// Chrome and WebKit apply the stylesheet unconditionally, so the
    /// Firefox-only `@-moz-document` scope is left off for them.
    pub fn wraps_consumer_build(&self) -> bool {
        !(self.config.chrome || self.config.webkit)
    }
}

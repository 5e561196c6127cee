//! Placeholder substitution over the base stylesheet.
//!
//! The base template is plain CSS with comment tokens of the form
//! `/*[[name]]*/`, for example:
//!
//! ```css
//! background-color: /*[[base-color]]*/ #4183C4;
//! ```
//!
//! A build is an ordered list of [`Rule`]s, each pairing a [`Matcher`] with a
//! literal replacement. [`apply`] runs them in order over the cumulative
//! text. There is no template language here: no loops, no conditionals, no
//! escaping.
//!
//! # Matching
//!
//! | Matcher | Replaces |
//! |---------|----------|
//! | [`Matcher::Literal`] | first occurrence of the substring |
//! | [`Matcher::Pattern`] with `global: false` | first regex match |
//! | [`Matcher::Pattern`] with `global: true` | every regex match |
//!
//! A rule that matches nothing is skipped. Replacement text is always
//! inserted verbatim; `$` has no special meaning.
//!
//! Because each rule sees the output of the previous ones, rules must target
//! distinct, non-nested tokens. [`check_unique_tokens`] verifies that every
//! token replaced only once really does occur at most once.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::error::{BuildError, Result};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*\[\[([A-Za-z0-9_-]+)\]\]\*/").expect("valid token regex"));

/// Formats a placeholder token, e.g. `token("tab-size")` → `/*[[tab-size]]*/`.
pub fn token(name: &str) -> String {
    format!("/*[[{}]]*/", name)
}

/// Counts every `/*[[name]]*/` token in `text`, keyed by name.
pub fn scan_tokens(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for caps in TOKEN.captures_iter(text) {
        *counts.entry(caps[1].to_string()).or_insert(0) += 1;
    }
    counts
}

/// What a rule looks for.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A literal substring; the first occurrence is replaced.
    Literal(String),
    /// A regular expression, replacing the first match or all of them.
    Pattern { regex: Regex, global: bool },
}

impl Matcher {
    fn is_global(&self) -> bool {
        matches!(self, Matcher::Pattern { global: true, .. })
    }
}

/// A single substitution step.
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: Matcher,
    replacement: String,
    /// Placeholder this rule consumes, if any.
    token: Option<&'static str>,
}

impl Rule {
    /// Replaces the first occurrence of `pattern`.
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Literal(pattern.into()),
            replacement: replacement.into(),
            token: None,
        }
    }

    /// Replaces the first match of `regex`.
    pub fn pattern(regex: &Regex, replacement: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Pattern {
                regex: regex.clone(),
                global: false,
            },
            replacement: replacement.into(),
            token: None,
        }
    }

    /// Replaces every match of `regex`.
    pub fn global(regex: &Regex, replacement: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Pattern {
                regex: regex.clone(),
                global: true,
            },
            replacement: replacement.into(),
            token: None,
        }
    }

    /// Records the placeholder name this rule consumes.
    pub fn consumes(mut self, name: &'static str) -> Self {
        self.token = Some(name);
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn token(&self) -> Option<&'static str> {
        self.token
    }

    /// Applies this rule to `text`, returning the new text.
    pub fn apply(&self, text: &str) -> String {
        match &self.matcher {
            Matcher::Literal(pattern) => text.replacen(pattern.as_str(), &self.replacement, 1),
            Matcher::Pattern {
                regex,
                global: false,
            } => regex
                .replace(text, NoExpand(&self.replacement))
                .into_owned(),
            Matcher::Pattern {
                regex,
                global: true,
            } => regex
                .replace_all(text, NoExpand(&self.replacement))
                .into_owned(),
        }
    }
}

/// Applies `rules` in order, each over the output of the previous one.
pub fn apply(template: &str, rules: &[Rule]) -> String {
    rules
        .iter()
        .fold(template.to_string(), |text, rule| rule.apply(&text))
}

/// Fails if a placeholder consumed by a non-global rule occurs more than once.
///
/// Such a token would be replaced at its first occurrence only and leave the
/// rest behind, so the result would depend on rule order.
pub fn check_unique_tokens(template: &str, rules: &[Rule]) -> Result<()> {
    let counts = scan_tokens(template);
    for rule in rules.iter().filter(|r| !r.matcher.is_global()) {
        let Some(name) = rule.token else { continue };
        let count = counts.get(name).copied().unwrap_or(0);
        if count > 1 {
            return Err(BuildError::DuplicateToken {
                token: token(name),
                count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_literal_replaces_first_only() {
        let rule = Rule::literal("/*[[x]]*/", "1");
        assert_eq!(rule.apply("a /*[[x]]*/ b /*[[x]]*/"), "a 1 b /*[[x]]*/");
    }

    #[test]
    fn test_pattern_first_vs_global() {
        let regex = re(r"/\*\[\[c\]\]\*/ #\w{3,6}");
        let text = "a: /*[[c]]*/ #fff; b: /*[[c]]*/ #123456;";
        assert_eq!(
            Rule::pattern(&regex, "#000").apply(text),
            "a: #000; b: /*[[c]]*/ #123456;"
        );
        assert_eq!(
            Rule::global(&regex, "#000").apply(text),
            "a: #000; b: #000;"
        );
    }

    #[test]
    fn test_no_match_is_noop() {
        let rules = vec![
            Rule::literal("/*[[missing]]*/", "x"),
            Rule::global(&re("nothing-here"), "y"),
        ];
        assert_eq!(apply("body{}", &rules), "body{}");
    }

    #[test]
    fn test_replacement_is_verbatim() {
        let rule = Rule::pattern(&re(r"X(\d)"), "$1 costs $$5");
        assert_eq!(rule.apply("X9"), "$1 costs $$5");
        assert_eq!(Rule::literal("X", "$0").apply("aXb"), "a$0b");
    }

    #[test]
    fn test_rules_see_previous_output() {
        let rules = vec![Rule::literal("A", "B"), Rule::literal("B", "C")];
        assert_eq!(apply("A", &rules), "C");
    }

    #[test]
    fn test_scan_tokens() {
        let counts = scan_tokens("/*[[a]]*/ x /*[[b-c]]*/ /*[[a]]*/ /* [[not]] */");
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b-c"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_check_unique_tokens() {
        let rules = vec![
            Rule::literal(token("once"), "1").consumes("once"),
            Rule::global(&re(r"/\*\[\[many\]\]\*/"), "2").consumes("many"),
        ];
        assert!(check_unique_tokens("/*[[once]]*/ /*[[many]]*/ /*[[many]]*/", &rules).is_ok());

        let err = check_unique_tokens("/*[[once]]*/ /*[[once]]*/", &rules).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateToken { count: 2, .. }));
    }
}

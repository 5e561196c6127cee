//! Rewrites `:is()` selector groups into plain selector lists.
//!
//! Older theme sources use a leading selector group such as
//!
//! ```css
//! :is(.a, .b) .c { color: red }
//! ```
//!
//! which not every target engine understands. The migration expands the
//! group against the selector that follows it:
//!
//! ```css
//! .a .c, .b .c { color: red }
//! ```
//!
//! Only a group at the start of a compound selector is handled (`:is(...) x`),
//! not one in the middle (`x :is(...)`). The rewrite is repeated until no
//! group remains, so running it on its own output changes nothing.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::Result;
use crate::fsutil::{list_files, read, write_atomic};

static GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":is\(([^)]+)\)\s([^,{]+)(,|\{)").expect("valid selector group regex")
});

static ALTERNATIVE_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid separator regex"));

/// Upper bound on rewrite passes. Real theme files settle after one.
const MAX_PASSES: usize = 32;

fn expand(caps: &Captures<'_>) -> String {
    let selector = caps[2].trim();
    let opens_block = &caps[3] == "{";
    let alternatives: Vec<&str> = ALTERNATIVE_SEP.split(&caps[1]).collect();
    let last = alternatives.len().saturating_sub(1);

    let mut out = String::new();
    for (index, alternative) in alternatives.iter().enumerate() {
        out.push_str(alternative);
        out.push(' ');
        out.push_str(selector);
        out.push_str(if index >= last && opens_block { " {" } else { ", " });
    }
    out
}

/// Expands every `:is()` group in `css`.
pub fn migrate(css: &str) -> String {
    let mut current = css.to_string();
    for _ in 0..MAX_PASSES {
        if !GROUP.is_match(&current) {
            break;
        }
        current = GROUP.replace_all(&current, expand).into_owned();
    }
    current
}

/// Migrates every file directly inside `dir`, in place.
///
/// Subdirectories are not visited. Files that need no change are not
/// rewritten. Returns the number of files changed.
pub fn migrate_dir(dir: &Path) -> Result<usize> {
    let mut changed = 0;
    for path in list_files(dir, None)? {
        let original = read(&path)?;
        let migrated = migrate(&original);
        if migrated != original {
            log::debug!("migrated selector groups in {}", path.display());
            write_atomic(&path, &migrated)?;
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_group_before_block() {
        assert_eq!(
            migrate(":is(.a, .b) .c{color:red}"),
            ".a .c, .b .c {color:red}"
        );
    }

    #[test]
    fn test_group_before_comma() {
        assert_eq!(
            migrate(":is(.a,.b) .c,.d{color:red}"),
            ".a .c, .b .c, .d{color:red}"
        );
    }

    #[test]
    fn test_single_alternative() {
        assert_eq!(migrate(":is(.x) .y .z {top:0}"), ".x .y .z {top:0}");
    }

    #[test]
    fn test_minified_jupyter_rule() {
        let input = ":is(.CodeMirror,.highlight) .cm-keyword{color:#cda869}:is(.CodeMirror,.highlight) .cm-atom{color:#cf6a4c}";
        let expected = ".CodeMirror .cm-keyword, .highlight .cm-keyword {color:#cda869}.CodeMirror .cm-atom, .highlight .cm-atom {color:#cf6a4c}";
        assert_eq!(migrate(input), expected);
    }

    #[test]
    fn test_without_groups_unchanged() {
        let css = ".a .b{color:red}.c:not(.d){top:0}";
        assert_eq!(migrate(css), css);
    }

    #[test]
    fn test_nested_groups_settle() {
        let once = migrate(":is(.a) .x:is(.b) .y{top:0}");
        assert!(!GROUP.is_match(&once));
        assert_eq!(migrate(&once), once);
    }

    #[test]
    fn test_migrate_dir_only_touches_top_level_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("a.min.css"), ":is(.a,.b) .c{top:0}").unwrap();
        std::fs::write(dir.path().join("b.min.css"), ".plain{top:0}").unwrap();
        std::fs::write(nested.join("c.min.css"), ":is(.a,.b) .c{top:0}").unwrap();

        assert_eq!(migrate_dir(dir.path()).unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.min.css")).unwrap(),
            ".a .c, .b .c {top:0}"
        );
        assert_eq!(
            std::fs::read_to_string(nested.join("c.min.css")).unwrap(),
            ":is(.a,.b) .c{top:0}"
        );

        // Second run finds nothing left to do.
        assert_eq!(migrate_dir(dir.path()).unwrap(), 0);
    }

    fn selector() -> impl Strategy<Value = String> {
        "[.#]?[a-z][a-z0-9-]{0,6}"
    }

    fn rule() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(selector(), 1..4),
            selector(),
            any::<bool>(),
            "[a-z]{1,6}:[0-9a-z#]{1,6}",
        )
            .prop_map(|(group, target, grouped, decl)| {
                if grouped {
                    format!(":is({}) {}{{{}}}", group.join(","), target, decl)
                } else {
                    format!("{} {}{{{}}}", group.join(" "), target, decl)
                }
            })
    }

    proptest! {
        #[test]
        fn migration_is_idempotent(rules in prop::collection::vec(rule(), 0..8)) {
            let css = rules.concat();
            let once = migrate(&css);
            prop_assert_eq!(migrate(&once), once.clone());
            prop_assert!(!once.contains(":is("));
        }

        #[test]
        fn text_without_groups_is_untouched(css in "[.a-z0-9 ,:{}#-]{0,60}") {
            prop_assert_eq!(migrate(&css), css);
        }
    }
}

//! Hex color to decimal triplet conversion.
//!
//! The template exposes the base color both as a hex literal and as a bare
//! `r, g, b` list for use inside `rgba(...)`. Only the 6-digit form is
//! accepted; anything else converts to an empty string, which callers treat
//! as "no color substitution applied".

use once_cell::sync::Lazy;
use regex::Regex;

static HEX6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#?([0-9a-f]{2})([0-9a-f]{2})([0-9a-f]{2})$").expect("valid hex regex")
});

/// Converts `#rrggbb` (the `#` is optional) to `"r, g, b"`.
///
/// Returns an empty string for shorthand, wrong-length or non-hex input.
///
/// ```
/// use restyle::color::hex_to_rgb;
///
/// assert_eq!(hex_to_rgb("#2288ff"), "34, 136, 255");
/// assert_eq!(hex_to_rgb("fff"), "");
/// ```
pub fn hex_to_rgb(hex: &str) -> String {
    let Some(caps) = HEX6.captures(hex) else {
        return String::new();
    };

    let mut channels = Vec::with_capacity(3);
    for group in 1..=3 {
        match u8::from_str_radix(&caps[group], 16) {
            Ok(value) => channels.push(value.to_string()),
            Err(_) => return String::new(),
        }
    }
    channels.join(", ")
}

/// Strips everything but ASCII word characters, for use in file names.
pub fn sanitize_for_filename(color: &str) -> String {
    color
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

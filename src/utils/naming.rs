//! Centralized naming utilities used across the schema scanner, the type
//! system builder, and the compiler.
//!
//! All derived names MUST come from these functions so that the scanner,
//! the builder, and the compiler agree on them: a relationship type label
//! turns into the same field name everywhere, and the identifier list
//! argument (`id` -> `ids`) is spelled the same way in the generated
//! argument surface and in the compiled statement.

use regex::Regex;
use std::sync::LazyLock;

/// Matches names that are safe to interpolate into Cypher text as-is:
/// labels, relationship types, property names and traversal variables.
static SAFE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Convert a relationship-type label to its default field name.
///
/// Labels are conventionally SCREAMING_SNAKE; the derived field name is
/// lowerCamel, matching how the field appears in a selection tree.
///
/// # Examples
/// ```
/// use graftql::utils::naming::lower_camel;
///
/// assert_eq!(lower_camel("LIVES_IN"), "livesIn");
/// assert_eq!(lower_camel("AGE"), "age");
/// assert_eq!(lower_camel("knows"), "knows");
/// ```
pub fn lower_camel(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut upper_next = false;
    for ch in label.chars() {
        if ch == '_' || ch == '-' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Pluralize a property name for the identifier list argument.
///
/// # Examples
/// ```
/// use graftql::utils::naming::pluralize;
///
/// assert_eq!(pluralize("id"), "ids");
/// assert_eq!(pluralize("city"), "cities");
/// assert_eq!(pluralize("alias"), "aliases");
/// ```
pub fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{}ies", stem);
        }
    }
    if name.ends_with('s') || name.ends_with('x') {
        return format!("{}es", name);
    }
    format!("{}s", name)
}

/// Disambiguate a colliding relationship field name with a suffix derived
/// from the underlying relationship-type label.
pub fn disambiguate(field: &str, rel_type: &str) -> String {
    format!("{}_{}", field, rel_type)
}

/// Whether a schema-supplied name may be interpolated into statement text.
///
/// Everything interpolated into Cypher (labels, relationship types,
/// property names) already comes from the schema snapshot, never from the
/// request; this check still rejects anything a malformed overlay could
/// smuggle in.
pub fn is_safe_identifier(name: &str) -> bool {
    SAFE_IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("LIVES_IN", "livesIn")]
    #[test_case("AGE", "age")]
    #[test_case("HAS_MANY_FRIENDS", "hasManyFriends")]
    #[test_case("knows", "knows")]
    #[test_case("_PRIVATE", "private")]
    fn lower_camel_cases(label: &str, expected: &str) {
        assert_eq!(lower_camel(label), expected);
    }

    #[test_case("id", "ids")]
    #[test_case("name", "names")]
    #[test_case("city", "cities")]
    #[test_case("key", "keys")]
    #[test_case("alias", "aliases")]
    fn pluralize_cases(name: &str, expected: &str) {
        assert_eq!(pluralize(name), expected);
    }

    #[test]
    fn disambiguation_keeps_both_parts() {
        assert_eq!(disambiguate("age", "AGE"), "age_AGE");
    }

    #[test]
    fn identifier_safety() {
        assert!(is_safe_identifier("livesIn"));
        assert!(is_safe_identifier("_age"));
        assert!(!is_safe_identifier("drop all"));
        assert!(!is_safe_identifier("a-b"));
        assert!(!is_safe_identifier(""));
    }
}

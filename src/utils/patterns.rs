//! Compile-time-constant regex helpers.

use regex::Regex;

/// Compiles a hard-coded pattern for a `LazyLock` static.
///
/// Panics on an invalid pattern. Callers only pass literals.
pub(crate) fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

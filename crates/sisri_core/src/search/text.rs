//! Case-insensitive text matching used by fetch and filter stages.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims a user-supplied value; blank values count as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Unicode-aware case-insensitive containment. An empty needle always matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Unicode-aware case-insensitive equality after trimming both sides.
pub fn eq_ci(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Grid codes are compared without whitespace: `19Q GA 8942` == `19qga8942`.
pub fn compact_grid_code(code: &str) -> String {
    WHITESPACE_RE.replace_all(code, "").to_lowercase()
}

/// Grid-code containment ignoring whitespace and case.
pub fn grid_code_contains(code: &str, term: &str) -> bool {
    compact_grid_code(code).contains(&compact_grid_code(term))
}

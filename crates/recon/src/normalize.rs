//! Field canonicalization used by the join predicate.
//!
//! Matching is whitespace- and case-insensitive; within-source duplicate
//! grouping deliberately bypasses this module and compares raw values.

/// Trim surrounding whitespace and case-fold.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Trim surrounding whitespace only (case preserved).
pub fn trim_only(value: &str) -> &str {
    value.trim()
}

/// `normalize` lifted over absent values. `None` passes through unchanged.
pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    value.map(normalize)
}

/// Case/whitespace-insensitive equality.
pub fn eq_normalized(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

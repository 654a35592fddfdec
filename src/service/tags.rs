//! Tag normalization
//!
//! Tags arrive as one comma-separated string. Names are trimmed and
//! lower-cased; the same rule applies to the `tag` filter on listings so
//! `/tag/Rust` finds posts tagged "rust".

/// Split a comma-separated tag string into normalized, distinct names
///
/// Order of first occurrence is kept.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for name in raw.split(',').filter_map(normalize_tag) {
        if !tags.contains(&name) {
            tags.push(name);
        }
    }
    tags
}

/// Normalize a single tag name. Blank names yield `None`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

/// Tag names joined back into the edit-form representation
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

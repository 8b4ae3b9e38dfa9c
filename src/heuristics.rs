/// Minimum number of whitespace-delimited tokens a unit needs, exclusive
pub const MIN_TOKENS: usize = 5;

/// Drops low-signal paragraphs from serialized Markdown.
///
/// The document is split on blank lines and a unit survives only if it has
/// more than [`MIN_TOKENS`] tokens. Short headings, table rows and code fences
/// are dropped along with short prose; callers opt in knowing that.
pub fn filter(markdown: &str) -> String {
    let mut filtered = String::with_capacity(markdown.len());
    for unit in split_units(markdown) {
        if token_count(unit) > MIN_TOKENS {
            filtered.push_str(unit);
            filtered.push_str("\n\n");
        }
    }
    filtered
}

/// Splits text into trimmed, non-empty blank-line separated units
pub fn split_units(markdown: &str) -> impl Iterator<Item = &str> {
    markdown
        .split("\n\n")
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
}

pub fn token_count(unit: &str) -> usize {
    unit.split_whitespace().count()
}

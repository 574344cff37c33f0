use std::collections::BTreeSet;

/// Canonical form used for every tag comparison: zero-width characters removed,
/// whitespace collapsed, ASCII lower-cased.
pub(crate) fn normalize_tag(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Normalizes a tag set, dropping values that are blank after cleanup.
pub(crate) fn normalize_tags<'a, I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .map(|value| normalize_tag(value))
        .filter(|value| !value.is_empty())
        .collect()
}

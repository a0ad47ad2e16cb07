use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Keep only the alphanumeric characters of a title.
///
/// Returns `None` when nothing is left, so that a title made of punctuation never
/// matches every other empty title in the corpus.
pub fn normalize_title(title: &str) -> Option<String> {
    let normalized: String = title.chars().filter(|c| c.is_alphanumeric()).collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Collation key: compatibility decomposition, combining marks dropped, lowercased.
///
/// Two strings that differ only by case or accents fold to the same key.
pub fn fold_key(value: &str) -> String {
    value
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

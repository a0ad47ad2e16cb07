use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A whole DOI field value in bare, `doi:` or doi.org URL form.
    /// The DOI itself runs to the first whitespace so SICI-style suffixes
    /// with parentheses, angle brackets and semicolons stay intact.
    pub static ref DOI_FIELD_PATTERN: Regex = Regex::new(
        r"(?i)^(?:doi[:\s]*|(?:https?://)?(?:dx\.|www\.)?doi\.org/)?(10\.\d+(?:\.\d+)*/\S+)"
    ).unwrap();

    static ref DOI_HOST_PATTERN: Regex = Regex::new(r"(?i)^(?:https?://)?(?:dx\.|www\.)?doi\.org/").unwrap();
}

/// Base of the canonical DOI URL form stored in corpus identifier lists
pub const DOI_URL_BASE: &str = "https://doi.org/";

fn decode_escapes(raw: &str) -> String {
    raw.replace("%2F", "/")
        .replace("%2f", "/")
        .replace("%3A", ":")
        .replace("%3a", ":")
        .replace("%3B", ";")
        .replace("%3b", ";")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%3C", "<")
        .replace("%3c", "<")
        .replace("%3E", ">")
        .replace("%3e", ">")
}

/// A closing bracket only trails off the DOI when it has no opening partner
fn unbalanced_close(doi: &str, open: char, close: char) -> bool {
    doi.matches(open).count() < doi.matches(close).count()
}

/// Clean up a captured DOI string
/// - Decode URL-encoded characters
/// - Strip trailing punctuation and unmatched closing brackets
/// - Normalize to lowercase
pub fn normalize_doi(doi: &str) -> String {
    let mut result = decode_escapes(doi.trim());

    loop {
        let strip = match result.chars().last() {
            Some('.' | ',' | ';' | ':' | '"' | '\'' | ' ') => true,
            Some(')') => unbalanced_close(&result, '(', ')'),
            Some(']') => unbalanced_close(&result, '[', ']'),
            Some('>') => unbalanced_close(&result, '<', '>'),
            _ => false,
        };
        if !strip {
            break;
        }
        result.pop();
    }

    // Strip trailing HTML entities
    for entity in &["&gt", "&lt", "&amp", "&quot"] {
        if result.ends_with(entity) {
            result.truncate(result.len() - entity.len());
        }
    }

    result.to_lowercase()
}

/// Extract and normalize the DOI from a field value in bare, `doi:` or URL form
pub fn parse_doi(raw: &str) -> Option<String> {
    let decoded = decode_escapes(raw.trim());
    let cap = DOI_FIELD_PATTERN.captures(&decoded)?;
    let doi = normalize_doi(cap.get(1)?.as_str());
    if doi.is_empty() {
        None
    } else {
        Some(doi)
    }
}

/// Canonical URL form of a normalized DOI
pub fn doi_url(doi: &str) -> String {
    format!("{}{}", DOI_URL_BASE, doi)
}

/// The DOI behind a `doi.org` link, if the URL is one
pub fn doi_from_url(url: &str) -> Option<String> {
    if DOI_HOST_PATTERN.is_match(url.trim()) {
        parse_doi(url)
    } else {
        None
    }
}

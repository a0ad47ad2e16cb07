use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Leading "arXiv" label with whatever punctuation/whitespace follows it: arXiv:, arXiv., arXiv
    static ref ARXIV_LABEL_PATTERN: Regex = Regex::new(r"(?i)^\s*arxiv[.:\s]*").unwrap();

    // Version suffix: 2403.03542v2, hep-ph/9901234v1
    static ref ARXIV_VERSION_PATTERN: Regex = Regex::new(r"(?i)v\d+$").unwrap();

    // arXiv URL format: arxiv.org/abs/YYMM.NNNNN or arxiv.org/pdf/YYMM.NNNNN
    pub static ref ARXIV_URL_PATTERN: Regex = Regex::new(
        r"(?i)arxiv\.org/(?:abs|pdf)/(\d{4}\.\d{4,6}(?:v\d+)?|[a-z][a-z0-9.-]*/\d{7}(?:v\d+)?)"
    ).unwrap();
}

/// Base of the canonical arXiv URL form stored in corpus identifier lists
pub const ARXIV_URL_BASE: &str = "https://arxiv.org/abs/";

/// Normalize an arXiv ID: drop an "arXiv:" label, whitespace and the version suffix, lowercase
pub fn normalize_arxiv_id(raw: &str) -> Option<String> {
    let id = ARXIV_LABEL_PATTERN.replace(raw, "");
    let id: String = id
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let id = ARXIV_VERSION_PATTERN.replace(&id, "").into_owned();

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Canonical URL form of a normalized arXiv ID
pub fn arxiv_url(id: &str) -> String {
    format!("{}{}", ARXIV_URL_BASE, id)
}

/// The arXiv ID behind an `arxiv.org/abs|pdf` link, if the URL is one
pub fn arxiv_from_url(url: &str) -> Option<String> {
    let cap = ARXIV_URL_PATTERN.captures(url)?;
    normalize_arxiv_id(cap.get(1)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_modern_format() {
        assert_eq!(normalize_arxiv_id("arXiv:2403.03542"), Some("2403.03542".to_string()));
        assert_eq!(normalize_arxiv_id("2403.03542"), Some("2403.03542".to_string()));
    }

    #[test]
    fn test_normalize_strips_version() {
        assert_eq!(normalize_arxiv_id("arXiv:2403.03542v2"), Some("2403.03542".to_string()));
        assert_eq!(normalize_arxiv_id("solv-int/9901001v1"), Some("solv-int/9901001".to_string()));
    }

    #[test]
    fn test_normalize_old_format() {
        assert_eq!(normalize_arxiv_id("arXiv:hep-ph/9901234"), Some("hep-ph/9901234".to_string()));
        assert_eq!(normalize_arxiv_id("arXiv:cs.DM/ 9910013"), Some("cs.dm/9910013".to_string()));
    }

    #[test]
    fn test_normalize_label_variants() {
        assert_eq!(normalize_arxiv_id("ArXiv. 2206.153252"), Some("2206.153252".to_string()));
        assert_eq!(normalize_arxiv_id("ARXIV 2206.15325"), Some("2206.15325".to_string()));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_arxiv_id("arXiv:"), None);
        assert_eq!(normalize_arxiv_id("   "), None);
    }

    #[test]
    fn test_arxiv_from_url() {
        assert_eq!(arxiv_from_url("https://arxiv.org/abs/2403.03542"), Some("2403.03542".to_string()));
        assert_eq!(arxiv_from_url("http://arxiv.org/pdf/2403.03542v3"), Some("2403.03542".to_string()));
        assert_eq!(arxiv_from_url("https://arxiv.org/abs/hep-ph/9901234"), Some("hep-ph/9901234".to_string()));
        assert_eq!(arxiv_from_url("https://doi.org/10.1/a"), None);
    }

    #[test]
    fn test_arxiv_url() {
        assert_eq!(arxiv_url("2403.03542"), "https://arxiv.org/abs/2403.03542");
    }
}

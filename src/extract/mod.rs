//! Identifier and title normalization shared by corpus import and resolution.

pub mod arxiv;
pub mod doi;
pub mod text;

pub use arxiv::*;
pub use doi::*;
pub use text::*;

/// Canonical form of a corpus identifier URL.
///
/// DOI links become `https://doi.org/<doi>` and arXiv links `https://arxiv.org/abs/<id>`,
/// whatever scheme, host alias or version suffix they were recorded with. Other URLs are
/// only trimmed.
pub fn canonical_identifier_url(url: &str) -> String {
    if let Some(doi) = doi_from_url(url) {
        doi_url(&doi)
    } else if let Some(id) = arxiv_from_url(url) {
        arxiv_url(&id)
    } else {
        url.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_identifier_url() {
        assert_eq!(canonical_identifier_url("http://dx.doi.org/10.1/A."), "https://doi.org/10.1/a");
        assert_eq!(
            canonical_identifier_url("https://arxiv.org/pdf/2403.03542v2"),
            "https://arxiv.org/abs/2403.03542"
        );
        assert_eq!(
            canonical_identifier_url(" https://ieeexplore.ieee.org/document/1 "),
            "https://ieeexplore.ieee.org/document/1"
        );
    }
}

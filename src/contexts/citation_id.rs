/// Deterministic id of the `index`-th citation of `cited` inside `citing`.
///
/// The citing id has `/` and `-` replaced by `_`; the cited id additionally has `.`
/// replaced, so DOIs become flat tokens. Published datasets rely on this exact form.
pub fn generate_citation_id(citing: &str, cited: &str, index: usize) -> String {
    let citing_norm = citing.replace(['/', '-'], "_");
    let cited_norm = cited.replace(['/', '-', '.'], "_");
    format!("{}>{}_CIT{}", citing_norm, cited_norm, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_keys() {
        assert_eq!(
            generate_citation_id("conf/acl/Smith20", "conf/acl/Johnson07", 0),
            "conf_acl_Smith20>conf_acl_Johnson07_CIT0"
        );
    }

    #[test]
    fn test_doi_cited_id() {
        assert_eq!(
            generate_citation_id("conf/acl/Smith20", "10.1234/example-2020", 0),
            "conf_acl_Smith20>10_1234_example_2020_CIT0"
        );
    }

    #[test]
    fn test_citing_keeps_dots() {
        assert_eq!(
            generate_citation_id("journals/corr/abs-1.2", "a.b", 3),
            "journals_corr_abs_1.2>a_b_CIT3"
        );
    }
}

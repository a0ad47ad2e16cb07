pub mod strategy;

pub use strategy::MatchStrategy;

use log::debug;

use crate::corpus::{CanonicalRecord, CorpusLookup};
use crate::extract::{arxiv_url, doi_url, normalize_arxiv_id, normalize_title, parse_doi};
use crate::store::StoreResult;

/// Outcome of resolving one bibliography entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A strategy matched a corpus record
    Resolved {
        record: CanonicalRecord,
        strategy: MatchStrategy,
    },
    /// No strategy matched; an expected outcome, not an error
    Unresolved,
}

impl Resolution {
    pub fn key(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { record, .. } => Some(&record.key),
            Resolution::Unresolved => None,
        }
    }

    pub fn strategy(&self) -> Option<MatchStrategy> {
        match self {
            Resolution::Resolved { strategy, .. } => Some(*strategy),
            Resolution::Unresolved => None,
        }
    }
}

/// Resolve candidate identifiers to a canonical corpus record.
///
/// Strategies run in [`MatchStrategy::ORDER`]; a strategy whose input is absent or does
/// not normalize is passed over, and the first one that matches wins. Inputs may be raw
/// field values: they are normalized here.
pub fn resolve<C>(
    corpus: &C,
    doi: Option<&str>,
    arxiv_id: Option<&str>,
    title: Option<&str>,
) -> StoreResult<Resolution>
where
    C: CorpusLookup + ?Sized,
{
    for strategy in MatchStrategy::ORDER {
        let found = match strategy {
            MatchStrategy::Doi => match doi.and_then(parse_doi) {
                Some(doi) => corpus.by_identifier_url(&doi_url(&doi))?,
                None => continue,
            },
            MatchStrategy::Arxiv => match arxiv_id.and_then(normalize_arxiv_id) {
                Some(id) => corpus.by_identifier_url(&arxiv_url(&id))?,
                None => continue,
            },
            MatchStrategy::Title => match title.and_then(normalize_title) {
                Some(title) => corpus.by_normalized_title(&title)?,
                None => continue,
            },
        };

        if let Some(record) = found {
            debug!("Resolved {} by {}", record.key, strategy);
            return Ok(Resolution::Resolved { record, strategy });
        }
    }
    Ok(Resolution::Unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusIndex;

    fn corpus() -> CorpusIndex {
        let mut index = CorpusIndex::new();
        index.insert(CanonicalRecord::new("conf/x/ByDoi", Some("Doi Paper"), ["https://doi.org/10.1/a"]));
        index.insert(CanonicalRecord::new("conf/x/ByArxiv", Some("Arxiv Paper"), [
            "https://arxiv.org/abs/2403.03542",
        ]));
        index.insert(CanonicalRecord::new("conf/x/ByTitle", Some("Foo Bar"), Vec::<String>::new()));
        index
    }

    #[test]
    fn test_doi_wins_over_other_strategies() {
        let result = resolve(&corpus(), Some("10.1/A"), Some("arXiv:2403.03542"), Some("Foo Bar")).unwrap();
        assert_eq!(result.key(), Some("conf/x/ByDoi"));
        assert_eq!(result.strategy(), Some(MatchStrategy::Doi));
    }

    #[test]
    fn test_unmatched_doi_falls_through_to_title() {
        let result = resolve(&corpus(), Some("10.1/x"), None, Some("foo-bar")).unwrap();
        assert_eq!(result.key(), Some("conf/x/ByTitle"));
        assert_eq!(result.strategy(), Some(MatchStrategy::Title));
    }

    #[test]
    fn test_arxiv_with_version_and_label() {
        let result = resolve(&corpus(), None, Some("arXiv:2403.03542v3"), None).unwrap();
        assert_eq!(result.key(), Some("conf/x/ByArxiv"));
        assert_eq!(result.strategy(), Some(MatchStrategy::Arxiv));
    }

    #[test]
    fn test_sici_dois_resolve_to_distinct_records() {
        let mut index = CorpusIndex::new();
        index.insert(CanonicalRecord::new("journals/jasis/A98", Some("First"), [
            "https://doi.org/10.1002/(SICI)1097-4571(199806)49:8<693::AID-ASI4>3.0.CO;2-0",
        ]));
        index.insert(CanonicalRecord::new("journals/jasis/B98", Some("Second"), [
            "https://doi.org/10.1002/(SICI)1097-4571(199806)49:8<700::AID-ASI5>3.0.CO;2-P",
        ]));
        index.insert(CanonicalRecord::new("journals/lancet/C20", Some("Third"), [
            "https://doi.org/10.1016/S0140-6736(20)30183-5",
        ]));

        let first = resolve(&index, Some("10.1002/(SICI)1097-4571(199806)49:8<693::AID-ASI4>3.0.CO;2-0"), None, None)
            .unwrap();
        let second = resolve(&index, Some("doi:10.1002/(sici)1097-4571(199806)49:8<700::aid-asi5>3.0.co;2-p"), None, None)
            .unwrap();
        let third = resolve(&index, Some("https://doi.org/10.1016/S0140-6736(20)30183-5"), None, None).unwrap();
        assert_eq!(first.key(), Some("journals/jasis/A98"));
        assert_eq!(second.key(), Some("journals/jasis/B98"));
        assert_eq!(third.key(), Some("journals/lancet/C20"));
        assert_eq!(third.strategy(), Some(MatchStrategy::Doi));
    }

    #[test]
    fn test_nothing_matches() {
        let result = resolve(&corpus(), Some("10.9/none"), Some("1234.5678"), Some("Unknown Work")).unwrap();
        assert_eq!(result, Resolution::Unresolved);
    }

    #[test]
    fn test_no_inputs_or_unusable_inputs() {
        assert_eq!(resolve(&corpus(), None, None, None).unwrap(), Resolution::Unresolved);
        assert_eq!(resolve(&corpus(), Some("nonsense"), Some(""), Some("!!")).unwrap(), Resolution::Unresolved);
    }
}

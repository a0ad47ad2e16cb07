use serde::{Deserialize, Serialize};

/// Which resolver strategy produced a canonical key, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Exact match on the canonical DOI URL
    Doi = 0,
    /// Exact match on the canonical arXiv URL
    Arxiv = 1,
    /// Case- and accent-insensitive match on the alphanumeric title
    Title = 2,
}

impl MatchStrategy {
    /// Strategies in resolution order
    pub const ORDER: [MatchStrategy; 3] = [MatchStrategy::Doi, MatchStrategy::Arxiv, MatchStrategy::Title];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Doi => "doi",
            MatchStrategy::Arxiv => "arxiv",
            MatchStrategy::Title => "title",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(serde_json::to_string(&MatchStrategy::Doi).unwrap(), "\"doi\"");
        assert_eq!(serde_json::to_string(&MatchStrategy::Arxiv).unwrap(), "\"arxiv\"");
        assert_eq!(serde_json::from_str::<MatchStrategy>("\"title\"").unwrap(), MatchStrategy::Title);
    }

    #[test]
    fn test_strategy_order() {
        assert!(MatchStrategy::Doi < MatchStrategy::Arxiv);
        assert!(MatchStrategy::Arxiv < MatchStrategy::Title);
        let mut sorted = MatchStrategy::ORDER;
        sorted.sort();
        assert_eq!(sorted, MatchStrategy::ORDER);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(MatchStrategy::Title.to_string(), "title");
    }
}

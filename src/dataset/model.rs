use serde::{Deserialize, Serialize};

/// Label used when a context has no section or intent
pub const UNKNOWN_LABEL: &str = "Unknown";

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

/// The paper whose bibliography was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitingPaper {
    #[serde(alias = "dblp_id")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// One occurrence of a citation in the citing paper's body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_id: Option<String>,
    #[serde(default = "unknown_label")]
    pub section: String,
    #[serde(default = "unknown_label")]
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "cite_start", skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, alias = "cite_end", skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

/// A bibliography entry that resolved to at least one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    #[serde(default, alias = "dblp_id", skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, alias = "bibliographic_reference")]
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citation_contexts: Vec<CitationContext>,
}

impl ResolvedReference {
    /// The identifier contexts are grouped under: canonical key, else DOI
    pub fn link_id(&self) -> Option<&str> {
        self.canonical_key.as_deref().or(self.doi.as_deref())
    }
}

/// One dataset document: a citing paper and every cited paper that resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub citing_paper: CitingPaper,
    pub cited_papers: Vec<ResolvedReference>,
}

/// Context reduced to structure and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrippedCitation {
    pub citation_id: String,
    pub section: String,
    pub intent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrippedReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Absent when the reference had no contexts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<StrippedCitation>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrippedEntry {
    pub citing_paper: CitingPaper,
    pub cited_papers: Vec<StrippedReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_omits_empty_contexts() {
        let reference = ResolvedReference {
            canonical_key: Some("conf/acl/Johnson07".into()),
            doi: None,
            raw_text: "Johnson. 2007.".into(),
            citation_contexts: vec![],
        };
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"canonical_key": "conf/acl/Johnson07", "raw_text": "Johnson. 2007."})
        );
    }

    #[test]
    fn test_legacy_field_names() {
        let entry: DatasetEntry = serde_json::from_str(
            r#"{"citing_paper": {"dblp_id": "conf/acl/Smith20"},
                "cited_papers": [{"dblp_id": "conf/acl/Johnson07", "bibliographic_reference": "J07",
                  "citation_contexts": [{"cite_start": 3, "cite_end": 9}]}]}"#,
        )
        .unwrap();
        assert_eq!(entry.citing_paper.key, "conf/acl/Smith20");
        let reference = &entry.cited_papers[0];
        assert_eq!(reference.link_id(), Some("conf/acl/Johnson07"));
        assert_eq!(reference.raw_text, "J07");
        let context = &reference.citation_contexts[0];
        assert_eq!((context.start, context.end), (Some(3), Some(9)));
        assert_eq!(context.section, UNKNOWN_LABEL);
        assert_eq!(context.intent, UNKNOWN_LABEL);
    }

    #[test]
    fn test_link_id_falls_back_to_doi() {
        let reference = ResolvedReference {
            canonical_key: None,
            doi: Some("10.1/a".into()),
            raw_text: String::new(),
            citation_contexts: vec![],
        };
        assert_eq!(reference.link_id(), Some("10.1/a"));
    }
}

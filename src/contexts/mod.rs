//! In-text citation contexts, grouped by (citing, cited) and linked onto resolved references.

pub mod citation_id;
pub mod loader;

pub use citation_id::generate_citation_id;
pub use loader::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::dataset::{CitationContext, ResolvedReference, UNKNOWN_LABEL};

/// One line of a citation-context file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    pub citing_paper_id: String,
    pub cited_paper_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    pub cite_start: u64,
    pub cite_end: u64,
    pub string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_intent: Option<String>,
    /// Fields this crate does not interpret, passed through on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContextRecord {
    pub fn intent_request(&self) -> crate::intent::IntentRequest {
        crate::intent::IntentRequest {
            text: self.string.clone(),
            cite_start: self.cite_start,
            cite_end: self.cite_end,
            section: self.section_name.clone(),
        }
    }
}

/// Contexts by citing id, then cited id, each group in file-encounter order
#[derive(Debug, Clone, Default)]
pub struct ContextIndex {
    groups: HashMap<String, HashMap<String, Vec<CitationContext>>>,
    total: usize,
}

impl ContextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to its group, assigning the next citation id of the group
    pub fn push(&mut self, record: ContextRecord) {
        let group = self
            .groups
            .entry(record.citing_paper_id.clone())
            .or_default()
            .entry(record.cited_paper_id.clone())
            .or_default();
        let citation_id = generate_citation_id(&record.citing_paper_id, &record.cited_paper_id, group.len());
        group.push(CitationContext {
            citation_id: Some(citation_id),
            section: record.section_name.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            intent: record.citation_intent.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            text: Some(record.string),
            start: Some(record.cite_start),
            end: Some(record.cite_end),
        });
        self.total += 1;
    }

    pub fn contexts_for(&self, citing: &str, cited: &str) -> Option<&[CitationContext]> {
        self.groups
            .get(citing)
            .and_then(|by_cited| by_cited.get(cited))
            .map(Vec::as_slice)
    }

    pub fn has_citing(&self, citing: &str) -> bool {
        self.groups.contains_key(citing)
    }

    pub fn citing_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of contexts across all groups
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Attach the (citing, cited) group to a resolved reference.
    ///
    /// The group is looked up by the reference's canonical key, or its DOI when no key
    /// resolved. Without a group the reference is returned unchanged.
    pub fn link(&self, citing: &str, mut reference: ResolvedReference) -> ResolvedReference {
        if let Some(contexts) = reference.link_id().and_then(|cited| self.contexts_for(citing, cited)) {
            reference.citation_contexts = contexts.to_vec();
        }
        reference
    }
}

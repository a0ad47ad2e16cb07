use std::ops::AddAssign;

use super::{DatasetEntry, StrippedCitation, StrippedEntry, StrippedReference};
use crate::contexts::generate_citation_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Also drop each reference's free-text citation
    pub drop_raw_text: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripStats {
    pub papers: u64,
    pub papers_with_contexts: u64,
    pub papers_without_contexts: u64,
    pub cited_with_contexts: u64,
    pub cited_without_contexts: u64,
    pub citations_stripped: u64,
}

impl AddAssign for StripStats {
    fn add_assign(&mut self, other: StripStats) {
        self.papers += other.papers;
        self.papers_with_contexts += other.papers_with_contexts;
        self.papers_without_contexts += other.papers_without_contexts;
        self.cited_with_contexts += other.cited_with_contexts;
        self.cited_without_contexts += other.cited_without_contexts;
        self.citations_stripped += other.citations_stripped;
    }
}

/// Reduce an entry to structure and intent labels, keeping raw citation text
pub fn strip(entry: &DatasetEntry) -> StrippedEntry {
    strip_with(entry, &StripOptions::default()).0
}

/// Reduce an entry to structure and intent labels.
///
/// Every context becomes `{citation_id, section, intent}`; its text and offsets are
/// gone. Stored citation ids are kept as they are; missing ones are generated from the
/// entry's citing key, the reference's key (or DOI) and the context's position.
pub fn strip_with(entry: &DatasetEntry, options: &StripOptions) -> (StrippedEntry, StripStats) {
    let mut stats = StripStats { papers: 1, ..Default::default() };
    let citing = entry.citing_paper.key.as_str();

    let cited_papers = entry
        .cited_papers
        .iter()
        .map(|reference| {
            let citations = if reference.citation_contexts.is_empty() {
                stats.cited_without_contexts += 1;
                None
            } else {
                stats.cited_with_contexts += 1;
                let cited = reference.link_id().unwrap_or_default();
                let citations: Vec<StrippedCitation> = reference
                    .citation_contexts
                    .iter()
                    .enumerate()
                    .map(|(index, context)| StrippedCitation {
                        citation_id: context
                            .citation_id
                            .clone()
                            .unwrap_or_else(|| generate_citation_id(citing, cited, index)),
                        section: context.section.clone(),
                        intent: context.intent.clone(),
                    })
                    .collect();
                stats.citations_stripped += citations.len() as u64;
                Some(citations)
            };

            StrippedReference {
                canonical_key: reference.canonical_key.clone(),
                doi: reference.doi.clone(),
                raw_text: if options.drop_raw_text {
                    None
                } else {
                    Some(reference.raw_text.clone())
                },
                citations,
            }
        })
        .collect();

    if stats.cited_with_contexts > 0 {
        stats.papers_with_contexts = 1;
    } else {
        stats.papers_without_contexts = 1;
    }

    let stripped = StrippedEntry {
        citing_paper: entry.citing_paper.clone(),
        cited_papers,
    };
    (stripped, stats)
}

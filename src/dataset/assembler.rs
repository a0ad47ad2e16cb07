use log::debug;
use serde_json::Value;

use super::{CitingPaper, DatasetEntry, ResolvedReference};
use crate::bibliography::{bibliography, paper_context_id, InputShape, RawCitationEntry};
use crate::contexts::ContextIndex;
use crate::corpus::{CanonicalRecord, CorpusLookup};
use crate::resolve::{resolve, MatchStrategy, Resolution};
use crate::stats::Counters;
use crate::store::StoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub shape: InputShape,
    /// Give key-only references the DOI of their canonical record
    pub attach_canonical_doi: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self { shape: InputShape::Auto, attach_canonical_doi: false }
    }
}

/// Result of processing one citing paper, before it is stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperAssembly {
    pub entry: Option<DatasetEntry>,
    pub counters: Counters,
}

/// Resolve one bibliography entry and count it.
///
/// | key | DOI | counters                                          |
/// |-----|-----|---------------------------------------------------|
/// | yes | yes | keys, DOIs, DOIs-with-key, citations              |
/// | yes | no  | keys, citations                                   |
/// | no  | yes | DOIs, citations (emitted with its DOI only)       |
/// | no  | no  | refs_skipped (nothing emitted)                    |
pub fn resolve_reference<C>(
    corpus: &C,
    raw: &RawCitationEntry,
    options: &AssemblyOptions,
    counters: &mut Counters,
) -> StoreResult<Option<ResolvedReference>>
where
    C: CorpusLookup + ?Sized,
{
    counters.refs_checked += 1;
    if !raw.has_candidates() {
        counters.refs_skipped += 1;
        debug!("Reference has no DOI, arXiv id or title: {:?}", raw.raw_text);
        return Ok(None);
    }

    let resolution = resolve(corpus, raw.doi.as_deref(), raw.arxiv_id.as_deref(), raw.title.as_deref())?;
    let (canonical_key, canonical_doi) = match &resolution {
        Resolution::Resolved { record, strategy } => {
            match strategy {
                MatchStrategy::Doi => counters.matched_by_doi += 1,
                MatchStrategy::Arxiv => counters.matched_by_arxiv += 1,
                MatchStrategy::Title => counters.matched_by_title += 1,
            }
            (Some(record.key.clone()), record.doi())
        }
        Resolution::Unresolved => (None, None),
    };

    let doi = match &raw.doi {
        Some(doi) => Some(doi.clone()),
        None if options.attach_canonical_doi => canonical_doi,
        None => None,
    };

    match (&canonical_key, &doi) {
        (Some(key), Some(_)) => {
            counters.dblp_keys_matched += 1;
            counters.dois_matched += 1;
            counters.dois_from_canonical_resolution += 1;
            debug!("Reference resolved to {} with DOI", key);
        }
        (Some(key), None) => {
            counters.dblp_keys_matched += 1;
            debug!("Reference resolved to {}", key);
        }
        (None, Some(doi)) => {
            counters.dois_matched += 1;
            debug!("Reference kept by DOI only: {}", doi);
        }
        (None, None) => {
            counters.refs_skipped += 1;
            debug!("No key or DOI for reference: {:?}", raw.title);
            return Ok(None);
        }
    }
    counters.citations += 1;

    Ok(Some(ResolvedReference {
        canonical_key,
        doi,
        raw_text: raw.raw_text.clone(),
        citation_contexts: Vec::new(),
    }))
}

/// Build the dataset entry of a citing paper, or `None` when nothing resolved
pub fn assemble(citing_key: &str, doi: Option<String>, resolved: Vec<ResolvedReference>) -> Option<DatasetEntry> {
    let cited_papers: Vec<ResolvedReference> = resolved
        .into_iter()
        .filter(|r| r.canonical_key.is_some() || r.doi.is_some())
        .collect();
    if cited_papers.is_empty() {
        return None;
    }
    Some(DatasetEntry {
        citing_paper: CitingPaper { key: citing_key.to_string(), doi },
        cited_papers,
    })
}

/// Id the context files use for the citing paper: the first candidate they know, else
/// the document's `paper_id`, else the canonical key
fn citing_context_id(paper: &Value, record: &CanonicalRecord, contexts: &ContextIndex) -> String {
    let candidates = [paper_context_id(paper), Some(record.key.clone()), Some(record.key_norm.clone())];
    candidates
        .iter()
        .flatten()
        .find(|id| contexts.has_citing(id))
        .cloned()
        .or_else(|| paper_context_id(paper))
        .unwrap_or_else(|| record.key.clone())
}

/// Parse, resolve, link and assemble one citing paper
pub fn process_paper<C>(
    corpus: &C,
    contexts: Option<&ContextIndex>,
    paper: &Value,
    record: &CanonicalRecord,
    options: &AssemblyOptions,
) -> StoreResult<PaperAssembly>
where
    C: CorpusLookup + ?Sized,
{
    let mut counters = Counters::default();
    let context_id = contexts.map(|index| citing_context_id(paper, record, index));

    let mut resolved = Vec::new();
    for bib in bibliography(paper, options.shape) {
        let raw = bib.parse();
        let Some(mut reference) = resolve_reference(corpus, &raw, options, &mut counters)? else {
            continue;
        };

        if let (Some(index), Some(citing)) = (contexts, context_id.as_deref()) {
            reference = index.link(citing, reference);
            if reference.citation_contexts.is_empty() {
                counters.cited_without_contexts += 1;
            } else {
                counters.cited_with_contexts += 1;
                counters.contexts_added += reference.citation_contexts.len() as u64;
            }
        }
        resolved.push(reference);
    }

    let entry = assemble(&record.key, record.doi(), resolved);
    if entry.is_none() {
        counters.papers_skipped_no_citations += 1;
        debug!("No resolved citations for {}", record.key);
    }
    Ok(PaperAssembly { entry, counters })
}

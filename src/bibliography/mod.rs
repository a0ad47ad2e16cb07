//! Bibliography extraction from citing-paper documents.
//!
//! Two input shapes are supported: document-structuring markup converted to JSON
//! (`biblStruct` nodes with `analytic`/`monogr`/`idno`/`note`) and pre-structured
//! entries (`title`, `other_ids`, `raw_text`). Both parse into [`RawCitationEntry`].

pub mod paper;
pub mod paths;

pub use paper::*;

use clap::ValueEnum;
use serde_json::Value;

use crate::extract::{normalize_arxiv_id, parse_doi};
use paths::*;

/// Layout of a citing-paper document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputShape {
    /// Pick per document: structured when a structured bibliography exists, else markup
    Auto,
    Markup,
    Structured,
}

/// Candidate identifiers and text of one bibliography item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCitationEntry {
    /// Normalized DOI
    pub doi: Option<String>,
    /// Normalized arXiv ID
    pub arxiv_id: Option<String>,
    /// Title as written
    pub title: Option<String>,
    /// Free-text citation, empty when the entry has none
    pub raw_text: String,
}

impl RawCitationEntry {
    pub fn has_candidates(&self) -> bool {
        self.doi.is_some() || self.arxiv_id.is_some() || self.title.is_some()
    }
}

/// One bibliography item, tagged with its shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BibRecord<'a> {
    Markup(&'a Value),
    Structured(&'a Value),
}

struct FieldTables {
    title: &'static [Accessor],
    doi: &'static [Accessor],
    arxiv: &'static [Accessor],
    raw_text: &'static [Accessor],
}

const MARKUP_FIELDS: FieldTables = FieldTables {
    title: MARKUP_TITLE,
    doi: MARKUP_DOI,
    arxiv: MARKUP_ARXIV,
    raw_text: MARKUP_RAW_TEXT,
};

const STRUCTURED_FIELDS: FieldTables = FieldTables {
    title: STRUCTURED_TITLE,
    doi: STRUCTURED_DOI,
    arxiv: STRUCTURED_ARXIV,
    raw_text: STRUCTURED_RAW_TEXT,
};

impl<'a> BibRecord<'a> {
    pub fn value(&self) -> &'a Value {
        match self {
            BibRecord::Markup(v) | BibRecord::Structured(v) => v,
        }
    }

    fn tables(&self) -> &'static FieldTables {
        match self {
            BibRecord::Markup(_) => &MARKUP_FIELDS,
            BibRecord::Structured(_) => &STRUCTURED_FIELDS,
        }
    }

    /// Extract candidates. Missing paths only leave fields empty.
    pub fn parse(&self) -> RawCitationEntry {
        let entry = self.value();
        let tables = self.tables();
        RawCitationEntry {
            doi: first_of(tables.doi, entry).and_then(|d| parse_doi(&d)),
            arxiv_id: first_of(tables.arxiv, entry).and_then(|a| normalize_arxiv_id(&a)),
            title: first_of(tables.title, entry),
            raw_text: first_of(tables.raw_text, entry).unwrap_or_default(),
        }
    }
}

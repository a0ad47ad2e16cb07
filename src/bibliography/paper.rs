use serde_json::Value;

use super::paths::{as_seq, text_of};
use super::{BibRecord, InputShape};

/// Where structured documents keep their bibliography, in precedence order
const STRUCTURED_BIB_PATHS: &[&[&str]] = &[&["pdf_parse", "bib_entries"], &["bib_entries"]];

/// Where markup documents keep their bibliography, in precedence order
const MARKUP_BIB_PATHS: &[&[&str]] = &[&["biblStruct"], &["listBibl", "biblStruct"]];

fn at_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, segment| node.get(segment))
}

fn first_path<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths
        .iter()
        .find_map(|path| at_path(value, path).filter(|node| !node.is_null()))
}

/// Shape of a document under `Auto`: structured when a structured bibliography exists
pub fn detect_shape(paper: &Value) -> InputShape {
    if first_path(paper, STRUCTURED_BIB_PATHS).is_some() {
        InputShape::Structured
    } else {
        InputShape::Markup
    }
}

/// Bibliography items of a document in file order.
///
/// Structured bibliographies may be an object keyed by reference id (kept in file order)
/// or an array. Markup `biblStruct` may be a single object or an array.
pub fn bibliography(paper: &Value, shape: InputShape) -> Vec<BibRecord<'_>> {
    let shape = match shape {
        InputShape::Auto => detect_shape(paper),
        explicit => explicit,
    };
    match shape {
        InputShape::Structured => match first_path(paper, STRUCTURED_BIB_PATHS) {
            Some(Value::Object(entries)) => entries.values().map(BibRecord::Structured).collect(),
            Some(Value::Array(entries)) => entries.iter().map(BibRecord::Structured).collect(),
            _ => Vec::new(),
        },
        _ => as_seq(first_path(paper, MARKUP_BIB_PATHS))
            .filter(|entry| entry.is_object())
            .map(BibRecord::Markup)
            .collect(),
    }
}

/// Id the citation-context files use for this paper, when the document carries one
pub fn paper_context_id(paper: &Value) -> Option<String> {
    paper.get("paper_id").and_then(text_of)
}

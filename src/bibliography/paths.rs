//! Accessor tables over bibliography entries.
//!
//! Each logical field has an ordered list of accessors; the first one that yields a
//! non-empty value wins. Missing nodes are `None`, never an error.

use serde_json::Value;

pub type Accessor = fn(&Value) -> Option<String>;

/// Text of a node: a string, an object's `#text`, or the first textual element of an array
pub fn text_of(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Object(map) => map.get("#text").and_then(text_of),
        Value::Array(items) => items.iter().find_map(text_of),
        _ => None,
    }
}

/// Treat a single node and an array of nodes the same way
pub fn as_seq(node: Option<&Value>) -> impl Iterator<Item = &Value> {
    let items: &[Value] = match node {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => &[],
        Some(single) => std::slice::from_ref(single),
    };
    items.iter()
}

fn has_type(node: &Value, wanted: &str) -> bool {
    node.get("@type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case(wanted))
}

/// Text of the first `idno` of the given `@type` under `parent`
fn typed_idno(parent: Option<&Value>, wanted: &str) -> Option<String> {
    as_seq(parent.and_then(|p| p.get("idno")))
        .filter(|idno| has_type(idno, wanted))
        .find_map(text_of)
}

fn title_under(parent: Option<&Value>) -> Option<String> {
    parent.and_then(|p| p.get("title")).and_then(text_of)
}

fn markup_analytic_title(entry: &Value) -> Option<String> {
    title_under(entry.get("analytic"))
}

fn markup_monogr_title(entry: &Value) -> Option<String> {
    title_under(entry.get("monogr"))
}

fn markup_analytic_doi(entry: &Value) -> Option<String> {
    typed_idno(entry.get("analytic"), "DOI")
}

fn markup_monogr_doi(entry: &Value) -> Option<String> {
    typed_idno(entry.get("monogr"), "DOI")
}

fn markup_analytic_arxiv(entry: &Value) -> Option<String> {
    typed_idno(entry.get("analytic"), "arXiv")
}

fn markup_monogr_arxiv(entry: &Value) -> Option<String> {
    typed_idno(entry.get("monogr"), "arXiv")
}

fn markup_raw_reference_note(entry: &Value) -> Option<String> {
    as_seq(entry.get("note"))
        .filter(|note| has_type(note, "raw_reference"))
        .find_map(text_of)
}

fn markup_any_note(entry: &Value) -> Option<String> {
    as_seq(entry.get("note")).find_map(text_of)
}

fn first_other_id(entry: &Value, kind: &str) -> Option<String> {
    as_seq(entry.get("other_ids").and_then(|ids| ids.get(kind))).find_map(text_of)
}

fn structured_title(entry: &Value) -> Option<String> {
    entry.get("title").and_then(text_of)
}

fn structured_doi(entry: &Value) -> Option<String> {
    first_other_id(entry, "DOI")
}

fn structured_arxiv(entry: &Value) -> Option<String> {
    first_other_id(entry, "arXiv")
}

fn structured_raw_text(entry: &Value) -> Option<String> {
    entry.get("raw_text").and_then(text_of)
}

pub const MARKUP_TITLE: &[Accessor] = &[markup_analytic_title, markup_monogr_title];
pub const MARKUP_DOI: &[Accessor] = &[markup_analytic_doi, markup_monogr_doi];
pub const MARKUP_ARXIV: &[Accessor] = &[markup_analytic_arxiv, markup_monogr_arxiv];
pub const MARKUP_RAW_TEXT: &[Accessor] = &[markup_raw_reference_note, markup_any_note];

pub const STRUCTURED_TITLE: &[Accessor] = &[structured_title];
pub const STRUCTURED_DOI: &[Accessor] = &[structured_doi];
pub const STRUCTURED_ARXIV: &[Accessor] = &[structured_arxiv];
pub const STRUCTURED_RAW_TEXT: &[Accessor] = &[structured_raw_text];

/// First non-empty value of an accessor table
pub fn first_of(table: &[Accessor], entry: &Value) -> Option<String> {
    table.iter().find_map(|accessor| accessor(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_of_shapes() {
        assert_eq!(text_of(&json!("  plain ")), Some("plain".to_string()));
        assert_eq!(text_of(&json!({"@level": "a", "#text": "inner"})), Some("inner".to_string()));
        assert_eq!(text_of(&json!([{"@type": "main"}, {"#text": "second"}])), Some("second".to_string()));
        assert_eq!(text_of(&json!({"@level": "a"})), None);
        assert_eq!(text_of(&json!(42)), None);
        assert_eq!(text_of(&json!("")), None);
    }

    #[test]
    fn test_analytic_title_precedes_monogr() {
        let entry = json!({
            "analytic": {"title": {"#text": "Article Title"}},
            "monogr": {"title": {"#text": "Proceedings"}}
        });
        assert_eq!(first_of(MARKUP_TITLE, &entry), Some("Article Title".to_string()));
    }

    #[test]
    fn test_monogr_title_when_analytic_missing_or_empty() {
        let entry = json!({"analytic": {"title": {"@level": "a"}}, "monogr": {"title": "Book"}});
        assert_eq!(first_of(MARKUP_TITLE, &entry), Some("Book".to_string()));
        let entry = json!({"analytic": null, "monogr": {"title": {"#text": "Book"}}});
        assert_eq!(first_of(MARKUP_TITLE, &entry), Some("Book".to_string()));
    }

    #[test]
    fn test_idno_single_and_multi() {
        let single = json!({"analytic": {"idno": {"@type": "DOI", "#text": "10.1/a"}}});
        assert_eq!(first_of(MARKUP_DOI, &single), Some("10.1/a".to_string()));

        let multi = json!({"analytic": {"idno": [
            {"@type": "arXiv", "#text": "arXiv:2403.03542"},
            {"@type": "DOI", "#text": "10.1/b"}
        ]}});
        assert_eq!(first_of(MARKUP_DOI, &multi), Some("10.1/b".to_string()));
        assert_eq!(first_of(MARKUP_ARXIV, &multi), Some("arXiv:2403.03542".to_string()));

        let monogr = json!({"monogr": {"idno": [{"@type": "doi", "#text": "10.1/c"}]}});
        assert_eq!(first_of(MARKUP_DOI, &monogr), Some("10.1/c".to_string()));
    }

    #[test]
    fn test_raw_reference_note_preferred() {
        let entry = json!({"note": [
            {"@type": "report_type", "#text": "Technical report"},
            {"@type": "raw_reference", "#text": "Smith. 2020. Foo."}
        ]});
        assert_eq!(first_of(MARKUP_RAW_TEXT, &entry), Some("Smith. 2020. Foo.".to_string()));

        let single = json!({"note": {"#text": "Only note"}});
        assert_eq!(first_of(MARKUP_RAW_TEXT, &single), Some("Only note".to_string()));
        assert_eq!(first_of(MARKUP_RAW_TEXT, &json!({})), None);
    }

    #[test]
    fn test_structured_fields() {
        let entry = json!({
            "title": "Foo Bar",
            "raw_text": "F. Bar. Foo Bar.",
            "other_ids": {"DOI": ["10.1/a", "10.1/b"], "arXiv": "2403.03542"}
        });
        assert_eq!(first_of(STRUCTURED_TITLE, &entry), Some("Foo Bar".to_string()));
        assert_eq!(first_of(STRUCTURED_DOI, &entry), Some("10.1/a".to_string()));
        assert_eq!(first_of(STRUCTURED_ARXIV, &entry), Some("2403.03542".to_string()));
        assert_eq!(first_of(STRUCTURED_RAW_TEXT, &entry), Some("F. Bar. Foo Bar.".to_string()));
        assert_eq!(first_of(STRUCTURED_DOI, &json!({"other_ids": {"DOI": []}})), None);
    }
}

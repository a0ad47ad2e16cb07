use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Declares a struct of `u64` counters with field-wise addition and subtraction.
macro_rules! counter_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$field_meta:meta])* $field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $($(#[$field_meta])* #[serde(default)] pub $field: u64,)+
        }

        impl $name {
            /// Field-wise `self - other`, floored at zero
            pub fn saturating_sub(&self, other: &Self) -> Self {
                Self { $($field: self.$field.saturating_sub(other.$field),)+ }
            }

            /// `(name, value)` pairs in declaration order
            pub fn fields(&self) -> Vec<(&'static str, u64)> {
                vec![$((stringify!($field), self.$field),)+]
            }
        }

        impl AddAssign<&$name> for $name {
            fn add_assign(&mut self, other: &$name) {
                $(self.$field += other.$field;)+
            }
        }
    };
}

counter_set! {
    /// Counters that accumulate across every run of a lineage
    Counters {
        /// Dataset entries inserted
        papers,
        papers_skipped_no_citations,
        refs_checked,
        refs_skipped,
        citations,
        dblp_keys_matched,
        dois_matched,
        dois_from_canonical_resolution,
        matched_by_doi,
        matched_by_arxiv,
        matched_by_title,
        contexts_added,
        cited_with_contexts,
        cited_without_contexts,
    }
}

counter_set! {
    /// Counters that describe only the most recent run
    RunCounters {
        papers_checked,
        papers_inserted,
        papers_skipped_existing,
        files_unmatched,
        files_already_parsed,
        files_failed,
    }
}

/// Running counters of a run: the cumulative set and the last-run set together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub counters: Counters,
    pub run: RunCounters,
}

impl Tally {
    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self {
            counters: self.counters.saturating_sub(&other.counters),
            run: self.run.saturating_sub(&other.run),
        }
    }
}

impl AddAssign<&Tally> for Tally {
    fn add_assign(&mut self, other: &Tally) {
        self.counters += &other.counters;
        self.run += &other.run;
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        *self += &other;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub run_id: String,
    pub timestamp: String,
    pub papers_checked: u64,
    pub papers_inserted: u64,
    pub papers_skipped_existing: u64,
    pub citations_added: u64,
}

/// The statistics document of one dataset lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub lineage: String,
    #[serde(default)]
    pub totals: Counters,
    #[serde(default)]
    pub last_run: RunCounters,
    #[serde(default)]
    pub total_runs: u64,
    /// Newest last
    #[serde(default)]
    pub run_history: Vec<RunHistoryEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl StatsSnapshot {
    pub fn new(lineage: &str) -> Self {
        let now = now_rfc3339();
        Self {
            lineage: lineage.to_string(),
            totals: Counters::default(),
            last_run: RunCounters::default(),
            total_runs: 0,
            run_history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The snapshot's counters as the starting point of a run's tally
    pub fn tally(&self) -> Tally {
        Tally {
            counters: self.totals.clone(),
            run: self.last_run.clone(),
        }
    }
}

/// Identity and bounds of the run being recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    pub run_id: String,
    pub timestamp: String,
    pub history_limit: usize,
}

impl RunStamp {
    pub fn new(history_limit: usize) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            timestamp: now_rfc3339(),
            history_limit,
        }
    }
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_arithmetic() {
        let mut a = Counters { citations: 5, refs_checked: 7, ..Default::default() };
        let b = Counters { citations: 2, refs_checked: 9, ..Default::default() };
        a += &b;
        assert_eq!(a.citations, 7);
        assert_eq!(a.refs_checked, 16);

        let diff = b.saturating_sub(&a);
        assert_eq!(diff.citations, 0);
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let run = RunCounters { papers_checked: 3, ..Default::default() };
        let fields = run.fields();
        assert_eq!(fields[0], ("papers_checked", 3));
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn test_snapshot_tolerates_missing_counters() {
        let snapshot: StatsSnapshot = serde_json::from_str(
            r#"{"lineage": "citations", "totals": {"citations": 4},
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.totals.citations, 4);
        assert_eq!(snapshot.totals.refs_checked, 0);
        assert!(snapshot.run_history.is_empty());
    }

    #[test]
    fn test_run_stamp_is_unique() {
        let a = RunStamp::new(10);
        let b = RunStamp::new(10);
        assert_ne!(a.run_id, b.run_id);
        assert!(!a.timestamp.is_empty());
    }
}

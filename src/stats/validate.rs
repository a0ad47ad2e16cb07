use log::{error, info};
use std::fmt;

use super::Counters;

/// One consistency check over a snapshot's cumulative counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantCheck {
    pub name: &'static str,
    pub expression: &'static str,
    pub lhs: i128,
    pub rhs: i128,
    pub passed: bool,
}

impl fmt::Display for InvariantCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({} vs {})",
            if self.passed { "PASS" } else { "FAIL" },
            self.name,
            self.expression,
            self.lhs,
            self.rhs
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantReport {
    pub checks: Vec<InvariantCheck>,
}

impl InvariantReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvariantCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// Passing checks at info, failing ones at error
    pub fn log(&self) {
        info!("==== INVARIANTS ====");
        for check in &self.checks {
            if check.passed {
                info!("  {}", check);
            } else {
                error!("  {}", check);
            }
        }
        if !self.all_passed() {
            error!(
                "{} of {} invariants failed; the statistics are inconsistent with the counted data",
                self.failures().count(),
                self.checks.len()
            );
        }
    }
}

fn equal(name: &'static str, expression: &'static str, lhs: i128, rhs: i128) -> InvariantCheck {
    InvariantCheck { name, expression, lhs, rhs, passed: lhs == rhs }
}

fn at_most(name: &'static str, expression: &'static str, lhs: i128, rhs: i128) -> InvariantCheck {
    InvariantCheck { name, expression, lhs, rhs, passed: lhs <= rhs }
}

/// Check the algebraic invariants of a set of cumulative counters
pub fn validate(totals: &Counters) -> InvariantReport {
    let c = |v: u64| v as i128;
    let checks = vec![
        equal(
            "reference accounting",
            "citations + refs_skipped == refs_checked",
            c(totals.citations) + c(totals.refs_skipped),
            c(totals.refs_checked),
        ),
        at_most(
            "canonical DOIs within key matches",
            "dois_from_canonical_resolution <= dblp_keys_matched",
            c(totals.dois_from_canonical_resolution),
            c(totals.dblp_keys_matched),
        ),
        at_most(
            "canonical DOIs within DOI matches",
            "dois_from_canonical_resolution <= dois_matched",
            c(totals.dois_from_canonical_resolution),
            c(totals.dois_matched),
        ),
        equal(
            "inclusion-exclusion",
            "citations == dblp_keys_matched + dois_matched - dois_from_canonical_resolution",
            c(totals.citations),
            c(totals.dblp_keys_matched) + c(totals.dois_matched) - c(totals.dois_from_canonical_resolution),
        ),
        equal(
            "strategy breakdown",
            "matched_by_doi + matched_by_arxiv + matched_by_title == dblp_keys_matched",
            c(totals.matched_by_doi) + c(totals.matched_by_arxiv) + c(totals.matched_by_title),
            c(totals.dblp_keys_matched),
        ),
        at_most(
            "context coverage",
            "cited_with_contexts + cited_without_contexts <= citations",
            c(totals.cited_with_contexts) + c(totals.cited_without_contexts),
            c(totals.citations),
        ),
    ];
    InvariantReport { checks }
}

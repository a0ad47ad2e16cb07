use super::{RunHistoryEntry, RunStamp, StatsSnapshot, Tally};

/// What a run added: `current - initial`, field by field
pub fn delta(initial: &Tally, current: &Tally) -> Tally {
    current.saturating_sub(initial)
}

/// Fold a run delta into the previous snapshot.
///
/// Cumulative counters add the delta; last-run counters are replaced by it. The run is
/// appended to the history, which keeps only the newest `history_limit` entries.
pub fn apply(previous: &StatsSnapshot, delta: &Tally, stamp: &RunStamp) -> StatsSnapshot {
    let mut next = previous.clone();
    next.totals += &delta.counters;
    next.last_run = delta.run.clone();
    next.total_runs += 1;
    next.updated_at = stamp.timestamp.clone();

    next.run_history.push(RunHistoryEntry {
        run_id: stamp.run_id.clone(),
        timestamp: stamp.timestamp.clone(),
        papers_checked: delta.run.papers_checked,
        papers_inserted: delta.run.papers_inserted,
        papers_skipped_existing: delta.run.papers_skipped_existing,
        citations_added: delta.counters.citations,
    });
    if next.run_history.len() > stamp.history_limit {
        let excess = next.run_history.len() - stamp.history_limit;
        next.run_history.drain(..excess);
    }

    next
}

/// New snapshot from the snapshot taken at run start and the run's running tally
pub fn update(initial: &StatsSnapshot, current: &Tally, stamp: &RunStamp) -> StatsSnapshot {
    apply(initial, &delta(&initial.tally(), current), stamp)
}

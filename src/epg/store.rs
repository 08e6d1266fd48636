//! Owner-side holder for the current schedule.
//!
//! Ingestion hands back a fresh table; the store swaps its `Arc` in one step.
//! Readers keep whatever snapshot they took. Each refresh takes a ticket and
//! a result is only applied if no newer ticket has been applied before it.

use super::ingest::{try_ingest, ProgressCallback};
use super::schedule::ScheduleTable;
use super::source::DocumentSource;
use crate::errors::GuideError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Identifies one refresh request. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug)]
struct Slot {
    table: Arc<ScheduleTable>,
    applied: u64,
}

#[derive(Debug)]
pub struct ScheduleStore {
    issued: AtomicU64,
    slot: RwLock<Slot>,
}

/// What a multi-source refresh did
#[derive(Debug)]
pub struct RefreshOutcome {
    pub succeeded: usize,
    /// Sources that were skipped, with why
    pub failures: Vec<(String, GuideError)>,
    /// False if every source failed or a newer refresh already landed
    pub committed: bool,
}

impl RefreshOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::with_table(ScheduleTable::new())
    }

    /// Start from an existing table, e.g. one loaded from the disk cache
    pub fn with_table(table: ScheduleTable) -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: RwLock::new(Slot {
                table: Arc::new(table),
                applied: 0,
            }),
        }
    }

    /// Current table. Cheap; the snapshot stays valid across later swaps.
    pub fn snapshot(&self) -> Arc<ScheduleTable> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot.table)
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Swap in `table` unless a newer refresh has already been applied.
    /// Returns whether the table was applied.
    pub fn commit(&self, ticket: RefreshTicket, table: ScheduleTable) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if ticket.0 <= slot.applied {
            debug!(ticket = ticket.0, applied = slot.applied, "Dropping stale EPG result");
            return false;
        }
        slot.table = Arc::new(table);
        slot.applied = ticket.0;
        true
    }

    /// Ingest every URL in order, merge the results (earlier sources first)
    /// and commit. Failed sources are skipped; if all fail the current table
    /// is kept.
    ///
    /// Overall progress is `(sources done + current fraction) / sources`,
    /// never decreasing, ending at 1.0 on commit and 0.0 otherwise.
    pub async fn refresh<S: DocumentSource>(
        &self,
        source: &S,
        urls: &[String],
        progress: ProgressCallback,
    ) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let mut merged = ScheduleTable::new();
        let mut outcome = RefreshOutcome {
            succeeded: 0,
            failures: Vec::new(),
            committed: false,
        };

        let count = urls.len().max(1) as f64;
        let high_water = Arc::new(Mutex::new(0.0_f64));

        for (index, url) in urls.iter().enumerate() {
            let scaled = scaled_progress(&progress, &high_water, index as f64, count);
            match try_ingest(source, url, scaled).await {
                Ok(table) => {
                    outcome.succeeded += 1;
                    merged.merge(table);
                }
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "Skipping EPG source");
                    outcome.failures.push((url.clone(), e));
                }
            }
        }

        if outcome.succeeded > 0 {
            outcome.committed = self.commit(ticket, merged);
        }

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed(),
            committed = outcome.committed,
            "EPG refresh finished"
        );
        progress(if outcome.committed { 1.0 } else { 0.0 });
        outcome
    }
}

fn scaled_progress(
    outer: &ProgressCallback,
    high_water: &Arc<Mutex<f64>>,
    index: f64,
    count: f64,
) -> ProgressCallback {
    let outer = Arc::clone(outer);
    let high_water = Arc::clone(high_water);
    Arc::new(move |fraction: f64| {
        let overall = ((index + fraction) / count).min(super::parser::MAX_PARTIAL_PROGRESS);
        let mut last = high_water.lock().unwrap_or_else(|e| e.into_inner());
        if overall > *last {
            *last = overall;
            outer(overall);
        }
    })
}

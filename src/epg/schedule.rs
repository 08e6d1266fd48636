use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single scheduled broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Channel id in the guide's own namespace (not a playback stream id)
    pub channel_key: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl Program {
    /// True if `at` falls inside `[start, stop)`. Inverted or empty intervals never air.
    pub fn is_airing_at(&self, at: DateTime<Utc>) -> bool {
        self.start < self.stop && self.start <= at && at < self.stop
    }

    /// Fraction of the slot elapsed at `at`, clamped to [0, 1]
    pub fn progress_at(&self, at: DateTime<Utc>) -> f64 {
        let total = (self.stop - self.start).num_seconds();
        if total <= 0 {
            return 0.0;
        }
        let elapsed = (at - self.start).num_seconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Programs grouped by channel key, each list in document order.
///
/// Produced whole by one ingestion run and never mutated afterwards; a refresh
/// builds a new table and the owner swaps it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTable {
    programs: HashMap<String, Vec<Program>>,
}

impl ScheduleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, program: Program) {
        self.programs
            .entry(program.channel_key.clone())
            .or_default()
            .push(program);
    }

    /// All programs for a channel, in document order
    pub fn programs_for(&self, channel_key: &str) -> &[Program] {
        self.programs
            .get(channel_key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The program airing at `now`. Lists are not time-sorted, so this scans.
    pub fn current_program(&self, channel_key: &str, now: DateTime<Utc>) -> Option<&Program> {
        self.programs_for(channel_key)
            .iter()
            .find(|p| p.is_airing_at(now))
    }

    /// Earliest well-formed program starting after `now`
    pub fn next_program(&self, channel_key: &str, now: DateTime<Utc>) -> Option<&Program> {
        self.programs_for(channel_key)
            .iter()
            .filter(|p| p.start > now && p.start < p.stop)
            .min_by_key(|p| p.start)
    }

    /// Programs overlapping `[from, to)`, in document order
    pub fn programs_in_range(
        &self,
        channel_key: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&Program> {
        self.programs_for(channel_key)
            .iter()
            .filter(|p| p.stop > from && p.start < to)
            .collect()
    }

    pub fn channel_keys(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(|k| k.as_str())
    }

    pub fn channel_count(&self) -> usize {
        self.programs.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Append every list from `other` after the lists already held.
    /// No de-duplication: overlapping sources keep both entries.
    pub fn merge(&mut self, other: ScheduleTable) {
        for (key, mut list) in other.programs {
            self.programs.entry(key).or_default().append(&mut list);
        }
    }
}

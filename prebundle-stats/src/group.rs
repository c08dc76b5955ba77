//! Per-Package Grouping
//!
//! Folds the run's file records into per-package accumulators: file count,
//! summed duration per tracked stage, and the group's wall-clock span. The
//! span runs from the earliest file start to the latest file end and may
//! exceed the sum of per-file durations, since a group's files can be in
//! flight concurrently.

use crate::duration::{TRACKED_STAGES, stage_duration};
use fxhash::FxHashMap;
use prebundle_core::FileRecord;

/// Grouping key for files whose package lookup failed or returned nothing.
pub const UNKNOWN_GROUP_KEY: &str = "unknown";

/// Aggregated statistics for one package's files, derived fresh each run.
#[derive(Debug, Clone)]
pub struct GroupStat {
    /// The package join key (manifest path, or [`UNKNOWN_GROUP_KEY`]).
    pub key: String,
    /// Number of files attributed to the package.
    pub file_count: usize,
    /// Earliest file-start timestamp among members, in milliseconds.
    pub span_start_ms: f64,
    /// Latest file-end timestamp among members, in milliseconds.
    pub span_end_ms: f64,
    stage_totals: FxHashMap<&'static str, f64>,
}

impl GroupStat {
    fn new(key: String) -> Self {
        Self {
            key,
            file_count: 0,
            span_start_ms: f64::INFINITY,
            span_end_ms: f64::NEG_INFINITY,
            stage_totals: FxHashMap::default(),
        }
    }

    fn fold(&mut self, record: &FileRecord) {
        let (Some(start), Some(end)) = (record.trace.start_ms(), record.trace.end_ms()) else {
            // A record always carries its start and end markers; one that
            // doesn't cannot contribute a span and is left out entirely.
            return;
        };

        self.file_count += 1;
        self.span_start_ms = self.span_start_ms.min(start);
        self.span_end_ms = self.span_end_ms.max(end);

        for pair in &TRACKED_STAGES {
            if let Some(d) = stage_duration(&record.trace, pair) {
                *self.stage_totals.entry(pair.name).or_insert(0.0) += d;
            }
        }
    }

    /// Summed duration for a tracked stage, in milliseconds. `None` when no
    /// member file executed the stage.
    pub fn stage_total(&self, stage: &str) -> Option<f64> {
        self.stage_totals.get(stage).copied()
    }

    /// Average duration for a tracked stage across the group's files.
    pub fn stage_average(&self, stage: &str) -> Option<f64> {
        if self.file_count == 0 {
            return None;
        }
        self.stage_total(stage).map(|t| t / self.file_count as f64)
    }

    /// Width of the group's wall-clock span, in milliseconds.
    pub fn span_ms(&self) -> f64 {
        self.span_end_ms - self.span_start_ms
    }
}

/// Group the run's records by package key.
///
/// Groups are created in first-encounter order and then stably sorted by
/// descending file count, so the most-impacted package leads the report
/// and ties keep their arrival order. Records without a resolved key fold
/// into the [`UNKNOWN_GROUP_KEY`] group rather than being dropped. The
/// result is identical for any ordering of `records`, up to floating-point
/// summation order.
pub fn aggregate(records: &[FileRecord]) -> Vec<GroupStat> {
    let mut groups: Vec<GroupStat> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for record in records {
        let key = record
            .package_key
            .as_deref()
            .unwrap_or(UNKNOWN_GROUP_KEY)
            .to_string();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupStat::new(key));
            groups.len() - 1
        });
        groups[slot].fold(record);
    }

    groups.retain(|g| g.file_count > 0);
    groups.sort_by(|a, b| b.file_count.cmp(&a.file_count));
    groups
}

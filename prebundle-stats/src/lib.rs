#![warn(missing_docs)]
//! Prebundle Stats - Trace Aggregation
//!
//! Pure aggregation math over the event traces a prebundling run collects:
//! - Named stage-pair durations with the previous-marker fallback
//! - Per-package folding: file counts, summed stage durations, wall-clock
//!   spans that account for concurrent files
//! - Stable most-impacted-first group ordering
//!
//! Nothing here suspends or touches the filesystem; package identities are
//! resolved by the caller before records arrive.

mod duration;
mod group;

pub use duration::{StagePair, TRACKED_STAGES, stage_duration};
pub use group::{GroupStat, UNKNOWN_GROUP_KEY, aggregate};

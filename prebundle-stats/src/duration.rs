//! Tracked Stage Pairs
//!
//! The closed table of named marker pairs the aggregator derives durations
//! from. Pairs are resolved by marker name on the trace, never by
//! positional offset, so a trace that skipped its optional stages yields
//! `None` for those pairs instead of a shifted interval.

use prebundle_core::{EventTrace, StageMarker};

/// A named duration between two stage markers.
///
/// A pair without an explicit `from` resolves through the trace's
/// "time since previous marker" fallback. The marker emission order is
/// fixed by the pipeline, which pins what "previous" means for the pairs
/// that rely on it: `read` always follows `start`, `compiled` always
/// follows `compile_start`.
#[derive(Debug, Clone, Copy)]
pub struct StagePair {
    /// Stable stage name used in accumulators and reports.
    pub name: &'static str,
    /// Marker the interval ends at.
    pub to: StageMarker,
    /// Marker the interval starts at, or `None` for the previous-event
    /// fallback.
    pub from: Option<StageMarker>,
}

/// The stages the aggregator tracks for every file: disk read, optional
/// preprocessing, compilation, and the full start-to-end span.
pub const TRACKED_STAGES: [StagePair; 4] = [
    StagePair {
        name: "read",
        to: StageMarker::Read,
        from: None,
    },
    StagePair {
        name: "preprocess",
        to: StageMarker::Preprocessed,
        from: Some(StageMarker::PreprocessStart),
    },
    StagePair {
        name: "compile",
        to: StageMarker::Compiled,
        from: None,
    },
    StagePair {
        name: "total",
        to: StageMarker::End,
        from: Some(StageMarker::Start),
    },
];

/// Duration of one tracked stage on one trace, in milliseconds. `None`
/// when the trace never reached (or skipped) the stage.
pub fn stage_duration(trace: &EventTrace, pair: &StagePair) -> Option<f64> {
    trace.duration_to(pair.to, pair.from)
}

//! Stage Markers and Event Traces
//!
//! A file's trip through the transform pipeline is recorded as an ordered
//! sequence of timestamped events, one per stage boundary. The marker set
//! is a closed enum so that stage-pair duration lookups are checked at
//! compile time rather than failing silently on a misspelled name.

use crate::clock::Clock;
use std::fmt;

/// Identifies a stage boundary within one file's transform pipeline.
///
/// Markers are emitted in the order the variants are declared. The
/// preprocess pair is only present when a preprocessor is configured;
/// every other marker appears in every successful trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageMarker {
    /// File entered the pipeline.
    Start,
    /// Source contents finished reading from disk.
    Read,
    /// Preprocessing is about to begin.
    PreprocessStart,
    /// Preprocessing finished.
    Preprocessed,
    /// Compilation is about to begin.
    CompileStart,
    /// Compilation finished.
    Compiled,
    /// Transformed output assembled; pipeline done.
    End,
}

impl StageMarker {
    /// The stable label used in reports and logging.
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Read => "read",
            Self::PreprocessStart => "preprocess_start",
            Self::Preprocessed => "preprocessed",
            Self::CompileStart => "compile_start",
            Self::Compiled => "compiled",
            Self::End => "end",
        }
    }
}

impl fmt::Display for StageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single timestamped stage boundary. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Which stage boundary this is.
    pub marker: StageMarker,
    /// Monotonic reading in milliseconds, relative to the run clock anchor.
    pub timestamp_ms: f64,
}

/// Append-only, chronologically ordered event sequence for one file.
///
/// Each pipeline invocation owns its trace exclusively until the finished
/// record is appended to the run context, so recording never contends with
/// other in-flight files.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    events: Vec<Event>,
}

impl EventTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append a marker stamped with the current clock reading.
    pub fn record(&mut self, marker: StageMarker, clock: &Clock) {
        self.record_at(marker, clock.now_ms());
    }

    /// Append a marker with an explicit timestamp.
    pub fn record_at(&mut self, marker: StageMarker, timestamp_ms: f64) {
        self.events.push(Event {
            marker,
            timestamp_ms,
        });
    }

    /// All events, in recording order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether the trace contains the given marker.
    pub fn contains(&self, marker: StageMarker) -> bool {
        self.events.iter().any(|e| e.marker == marker)
    }

    /// Timestamp of the first occurrence of `marker`.
    pub fn timestamp_of(&self, marker: StageMarker) -> Option<f64> {
        self.events
            .iter()
            .find(|e| e.marker == marker)
            .map(|e| e.timestamp_ms)
    }

    /// Duration ending at `to`, in milliseconds.
    ///
    /// With an explicit `from` marker the interval is resolved by name on
    /// both ends. Without one, the interval starts at the event immediately
    /// preceding `to` in the trace ("time since previous marker"), which
    /// keeps lookups meaningful for traces where optional stages were
    /// skipped. Returns `None` when `to` is absent, when a named `from` is
    /// absent, or when `to` is the first event and no `from` was given.
    pub fn duration_to(&self, to: StageMarker, from: Option<StageMarker>) -> Option<f64> {
        let to_index = self.events.iter().position(|e| e.marker == to)?;
        let to_ms = self.events[to_index].timestamp_ms;

        let from_ms = match from {
            Some(marker) => self.timestamp_of(marker)?,
            None => {
                if to_index == 0 {
                    return None;
                }
                self.events[to_index - 1].timestamp_ms
            }
        };

        Some(to_ms - from_ms)
    }

    /// Timestamp of the `Start` marker.
    pub fn start_ms(&self) -> Option<f64> {
        self.timestamp_of(StageMarker::Start)
    }

    /// Timestamp of the `End` marker.
    pub fn end_ms(&self) -> Option<f64> {
        self.timestamp_of(StageMarker::End)
    }
}

/// One processed file: its path, its full event trace, and the package it
/// was later attributed to.
///
/// `package_key` is unset while the file is in flight and filled in by the
/// out-of-band package-identity resolution after the run ends. Records are
/// discarded with their run context; nothing survives across runs.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// The file's path as handed to the load hook.
    pub path: String,
    /// The ordered stage-boundary events recorded while transforming it.
    pub trace: EventTrace,
    /// Aggregation join key, resolved after the run ends.
    pub package_key: Option<String>,
}

impl FileRecord {
    /// Create a record for a freshly transformed file, not yet attributed
    /// to a package.
    pub fn new(path: impl Into<String>, trace: EventTrace) -> Self {
        Self {
            path: path.into(),
            trace,
            package_key: None,
        }
    }
}

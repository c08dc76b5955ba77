//! Per-Run Context
//!
//! One `RunContext` is constructed per prebundling run, synchronously
//! before any file of that run is dispatched. It owns the run clock, the
//! run-start reading, and the shared record list — the only state touched
//! by more than one in-flight file pipeline. Appends go through a mutex so
//! records land whole; no partial or interleaved traces are observable.

use crate::clock::Clock;
use crate::event::FileRecord;
use parking_lot::Mutex;

/// Run-scoped state shared by every file pipeline of a single run.
///
/// Constructing the context is the run-start signal's effect: the record
/// list starts empty and the run-start timestamp is taken once. A record
/// appended here belongs unambiguously to this run; a new run gets a new
/// context and never observes an older run's records.
#[derive(Debug)]
pub struct RunContext {
    clock: Clock,
    run_start_ms: f64,
    records: Mutex<Vec<FileRecord>>,
}

impl RunContext {
    /// Begin a run: anchor the clock and reset the record list.
    pub fn begin() -> Self {
        let clock = Clock::start();
        let run_start_ms = clock.now_ms();
        Self {
            clock,
            run_start_ms,
            records: Mutex::new(Vec::new()),
        }
    }

    /// The run's clock, shared by all file pipelines.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Clock reading taken when the run began.
    pub fn run_start_ms(&self) -> f64 {
        self.run_start_ms
    }

    /// Milliseconds elapsed since the run began.
    pub fn elapsed_ms(&self) -> f64 {
        self.clock.now_ms() - self.run_start_ms
    }

    /// Append a finished file record.
    ///
    /// The append is atomic per record; this is the only cross-file shared
    /// mutation in the pipeline.
    pub fn append(&self, record: FileRecord) {
        self.records.lock().push(record);
    }

    /// Number of records appended so far.
    pub fn record_count(&self) -> usize {
        self.records.lock().len()
    }

    /// Drain the records for aggregation. Intended to be called once, after
    /// the run-end signal; subsequent calls return an empty list.
    pub fn finish(&self) -> Vec<FileRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

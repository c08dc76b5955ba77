#![warn(missing_docs)]
//! Prebundle Report - Performance Report Rendering
//!
//! Renders the aggregated per-package compile statistics into the single
//! human-readable text report a run emits, and the actionable hint used
//! when exactly one file was processed. Text only: the report goes to a
//! logging collaborator, never to a file or the network.

mod format;
mod report;

pub use format::format_duration;
pub use report::{
    GroupReportEntry, RunReport, StageReportEntry, build_run_report, format_report,
    format_single_file_hint,
};

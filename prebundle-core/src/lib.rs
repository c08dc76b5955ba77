#![warn(missing_docs)]
//! Prebundle Core - Pipeline Runner
//!
//! This crate provides the instrumented per-file transform pipeline that
//! runs during a bundler's dependency-prebundling pass:
//! - Monotonic run clock with `f64` millisecond readings
//! - Closed stage-marker set and first-class event traces
//! - Per-run context owning the shared record list
//! - The read → preprocess → compile pipeline with paired stage events
//! - Collaborator traits for the compiler, preprocessor, package
//!   resolution, manifest reading, and the report sink
//! - The per-file error taxonomy and host diagnostic shape

mod clock;
mod collab;
mod error;
mod event;
mod pipeline;
mod run;

pub use clock::Clock;
pub use collab::{
    CompileOptions, CompileOutput, Compiler, ManifestReader, OptionsResolver, PackageResolver,
    PreprocessOutput, Preprocessor, ReportSink, SourceMap,
};
pub use error::{CompileError, Diagnostic, PipelineError, PreprocessError};
pub use event::{Event, EventTrace, FileRecord, StageMarker};
pub use pipeline::{MapStyle, PipelineRunner, TransformOutput};
pub use run::RunContext;

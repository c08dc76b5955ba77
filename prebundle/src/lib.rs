#![warn(missing_docs)]
//! # Prebundle
//!
//! Bundler plugin that compiles component files during a dependency
//! prebundling pass and reports where the time went:
//! - **Instrumented pipeline**: every file is driven through read →
//!   optional preprocess → compile with a timestamped event at each stage
//!   boundary, without perturbing the timing it measures
//! - **Per-package attribution**: files are grouped by their owning
//!   package's manifest, resolved concurrently after the run
//! - **Actionable reporting**: one aggregated text report per run, sorted
//!   by most-impacted package; a run that compiled a single file gets an
//!   exclude-or-import-directly hint instead, since prebundling one
//!   sub-module is usually a dependency misconfiguration
//! - **Local failures**: a broken file yields a compiler-style diagnostic
//!   and aborts only its own processing
//!
//! ## Quick Start
//!
//! ```ignore
//! use prebundle::{PluginConfig, PrebundlePlugin};
//! use std::sync::Arc;
//!
//! let plugin = PrebundlePlugin::builder(
//!     PluginConfig::default(),
//!     Arc::new(MyComponentCompiler::new()),
//!     Arc::new(MyPackageResolver::new()),
//! )
//! .preprocessor(Arc::new(MyPreprocessor::new()))
//! .build();
//!
//! // Wired into the host bundler's hooks:
//! plugin.on_run_start();
//! let result = plugin.load(path).await;
//! plugin.on_run_end().await; // emits the performance report
//! ```

mod config;
mod plugin;
mod resolve;

pub use config::{PluginConfig, SourceMapStyle};
pub use plugin::{LoadResult, PrebundlePlugin, PrebundlePluginBuilder};
pub use resolve::{FsManifestReader, TracingReportSink};

// Re-export the collaborator traits and pipeline types host integrations
// implement against.
pub use prebundle_core::{
    CompileError, CompileOptions, CompileOutput, Compiler, Diagnostic, EventTrace, FileRecord,
    ManifestReader, OptionsResolver, PackageResolver, PipelineError, PreprocessError,
    PreprocessOutput, Preprocessor, ReportSink, SourceMap, StageMarker,
};
pub use prebundle_report::{RunReport, format_duration, format_report};
pub use prebundle_stats::{GroupStat, TRACKED_STAGES, UNKNOWN_GROUP_KEY, aggregate};

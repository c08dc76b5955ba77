//! The Prebundling Plugin
//!
//! User-facing surface wiring the pipeline runner, the aggregation pass,
//! and the report renderer to the host bundler's plugin hooks:
//!
//! ```text
//! on_run_start ─▶ fresh RunContext
//!       │
//!       ▼
//! load × N (concurrent) ─▶ transform pipeline ─▶ FileRecord per success
//!       │
//!       ▼
//! on_run_end ─▶ resolve package identities ─▶ aggregate ─▶ report sink
//! ```
//!
//! Every hook is infallible from the host's point of view: per-file
//! failures come back as diagnostics inside the load result, and the
//! reporting pass is best-effort observational output.

use crate::config::PluginConfig;
use crate::resolve::{FsManifestReader, TracingReportSink, resolve_identity};
use futures::future::join_all;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use prebundle_core::{
    Compiler, Diagnostic, ManifestReader, OptionsResolver, PackageResolver, PipelineRunner,
    Preprocessor, ReportSink, RunContext,
};
use prebundle_report::{build_run_report, format_report, format_single_file_hint};
use prebundle_stats::{UNKNOWN_GROUP_KEY, aggregate};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a load hook invocation, in the shape the host expects.
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// Transformed module contents for the host's module loader.
    Contents {
        /// Executable module source with the source-map directive merged in.
        contents: String,
    },
    /// The file failed to transform; diagnostics for the host's channel.
    Failure {
        /// Compiler-style diagnostics at the reported location.
        diagnostics: Vec<Diagnostic>,
    },
    /// The path is outside the configured extension set; the host should
    /// fall through to its other loaders.
    Skipped,
}

/// Builder for [`PrebundlePlugin`].
///
/// The compiler and package resolver are mandatory collaborators; the
/// preprocessor and dynamic option resolver are optional stages, and the
/// manifest reader and report sink default to the filesystem- and
/// `tracing`-backed implementations.
pub struct PrebundlePluginBuilder {
    config: PluginConfig,
    compiler: Arc<dyn Compiler>,
    package_resolver: Arc<dyn PackageResolver>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
    options_resolver: Option<Arc<dyn OptionsResolver>>,
    manifest_reader: Arc<dyn ManifestReader>,
    report_sink: Arc<dyn ReportSink>,
}

impl PrebundlePluginBuilder {
    /// Configure the optional preprocessing stage.
    pub fn preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Configure per-file dynamic compile-option resolution.
    pub fn options_resolver(mut self, resolver: Arc<dyn OptionsResolver>) -> Self {
        self.options_resolver = Some(resolver);
        self
    }

    /// Replace the default filesystem manifest reader.
    pub fn manifest_reader(mut self, reader: Arc<dyn ManifestReader>) -> Self {
        self.manifest_reader = reader;
        self
    }

    /// Replace the default `tracing`-backed report sink.
    pub fn report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = sink;
        self
    }

    /// Build the plugin instance.
    pub fn build(self) -> PrebundlePlugin {
        let runner = PipelineRunner::new(
            self.compiler,
            self.preprocessor,
            self.options_resolver,
            self.config.compile_options(),
            self.config.source_map.into(),
        );
        PrebundlePlugin {
            config: self.config,
            runner,
            package_resolver: self.package_resolver,
            manifest_reader: self.manifest_reader,
            report_sink: self.report_sink,
            run: Mutex::new(Arc::new(RunContext::begin())),
        }
    }
}

/// One plugin instance per bundling run lifecycle.
///
/// The host guarantees `on_run_start` happens-before any `load` of that
/// run, and `on_run_end` after all of them; loads themselves run
/// concurrently.
pub struct PrebundlePlugin {
    config: PluginConfig,
    runner: PipelineRunner,
    package_resolver: Arc<dyn PackageResolver>,
    manifest_reader: Arc<dyn ManifestReader>,
    report_sink: Arc<dyn ReportSink>,
    run: Mutex<Arc<RunContext>>,
}

impl PrebundlePlugin {
    /// Start building a plugin around the two mandatory collaborators.
    pub fn builder(
        config: PluginConfig,
        compiler: Arc<dyn Compiler>,
        package_resolver: Arc<dyn PackageResolver>,
    ) -> PrebundlePluginBuilder {
        PrebundlePluginBuilder {
            config,
            compiler,
            package_resolver,
            preprocessor: None,
            options_resolver: None,
            manifest_reader: Arc::new(FsManifestReader),
            report_sink: Arc::new(TracingReportSink),
        }
    }

    /// Run-start hook: reset run state before any file is dispatched.
    pub fn on_run_start(&self) {
        *self.run.lock() = Arc::new(RunContext::begin());
        debug!("prebundling run started");
    }

    /// Per-file load hook.
    ///
    /// Transforms a matched file into executable module code; failures are
    /// returned as diagnostics and never panic across the boundary or
    /// affect other in-flight files.
    pub async fn load(&self, path: &Path) -> LoadResult {
        if !self.config.matches(path) {
            return LoadResult::Skipped;
        }
        let ctx = self.current_run();
        match self.runner.transform_file(path, &ctx).await {
            Ok(output) => LoadResult::Contents {
                contents: output.contents,
            },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "transform failed");
                let file = path.to_string_lossy();
                LoadResult::Failure {
                    diagnostics: vec![err.to_diagnostic(&file)],
                }
            }
        }
    }

    /// Run-end hook: resolve package identities, aggregate, and emit the
    /// report (or the single-file hint) to the sink.
    ///
    /// Purely observational and best-effort; nothing in here can fail the
    /// build.
    pub async fn on_run_end(&self) {
        let ctx = self.current_run();
        let mut records = ctx.finish();
        if records.is_empty() || !self.config.emit_report {
            return;
        }

        // All package lookups proceed concurrently; individual failures
        // already degraded to the "unknown" identity inside resolution.
        let identities = join_all(records.iter().map(|record| {
            resolve_identity(
                self.package_resolver.as_ref(),
                self.manifest_reader.as_ref(),
                &record.path,
            )
        }))
        .await;

        let mut display_names: FxHashMap<String, String> = FxHashMap::default();
        for (record, identity) in records.iter_mut().zip(identities) {
            record.package_key = Some(identity.key.clone());
            display_names.entry(identity.key).or_insert(identity.display_name);
        }

        // Prebundling exactly one sub-module of a package is itself the
        // actionable signal; skip the grouping arithmetic and say so.
        if let [record] = records.as_slice() {
            let key = record.package_key.as_deref().unwrap_or(UNKNOWN_GROUP_KEY);
            let display = display_names
                .get(key)
                .map(String::as_str)
                .unwrap_or(key);
            self.report_sink
                .emit(&format_single_file_hint(&record.path, display));
            return;
        }

        let groups = aggregate(&records);
        let report = build_run_report(&groups, &display_names, ctx.elapsed_ms());
        self.report_sink.emit(&format_report(&report));
    }

    fn current_run(&self) -> Arc<RunContext> {
        Arc::clone(&self.run.lock())
    }
}

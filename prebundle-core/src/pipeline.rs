//! Per-File Transform Pipeline
//!
//! Drives one file through read → optional preprocess → optional dynamic
//! option resolution → compile, recording a stage marker immediately on
//! each side of every suspension point. Timestamps bracket the external
//! call itself, on the same logical thread of execution, so scheduler
//! latency is never booked as stage cost.
//!
//! ## Stage order
//!
//! ```text
//! start ──▶ read ──▶ [preprocess_start ──▶ preprocessed] ──▶
//!     [dynamic options] ──▶ compile_start ──▶ compiled ──▶ end
//! ```
//!
//! The bracketed stages are skipped entirely (no markers) when not
//! configured; duration lookups downstream resolve marker pairs by name,
//! never by position, so absence cannot shift the meaning of neighbors.

use crate::collab::{CompileOptions, Compiler, OptionsResolver, Preprocessor, SourceMap};
use crate::error::PipelineError;
use crate::event::{EventTrace, FileRecord, StageMarker};
use crate::run::RunContext;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// How the trailing `sourceMappingURL` directive refers to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStyle {
    /// Inline `data:` URL carrying the whole map.
    #[default]
    Inline,
    /// Reference to a sibling `<file>.map` next to the module.
    External,
}

/// Transformed module contents for one file.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Executable module source with the trailing source-map directive
    /// merged in.
    pub contents: String,
}

/// Executes the transform pipeline for matched files and records their
/// event traces into the run context.
///
/// One runner is shared by all files of a run; each `transform_file` call
/// owns its trace privately until the single append at the end.
pub struct PipelineRunner {
    compiler: Arc<dyn Compiler>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
    options_resolver: Option<Arc<dyn OptionsResolver>>,
    base_options: CompileOptions,
    map_style: MapStyle,
}

impl PipelineRunner {
    /// Create a runner around the configured collaborators.
    pub fn new(
        compiler: Arc<dyn Compiler>,
        preprocessor: Option<Arc<dyn Preprocessor>>,
        options_resolver: Option<Arc<dyn OptionsResolver>>,
        base_options: CompileOptions,
        map_style: MapStyle,
    ) -> Self {
        Self {
            compiler,
            preprocessor,
            options_resolver,
            base_options,
            map_style,
        }
    }

    /// Transform one file into executable module code.
    ///
    /// On success the file's record (path + full event trace) is appended
    /// to `ctx` and the assembled module contents are returned. On failure
    /// nothing is appended and the error is returned for conversion into a
    /// host diagnostic; other in-flight files are unaffected.
    pub async fn transform_file(
        &self,
        path: &Path,
        ctx: &RunContext,
    ) -> Result<TransformOutput, PipelineError> {
        let filename = path.to_string_lossy().into_owned();
        let clock = ctx.clock();
        let mut trace = EventTrace::new();

        trace.record(StageMarker::Start, clock);
        let mut source =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PipelineError::Read {
                    path: filename.clone(),
                    source,
                })?;
        trace.record(StageMarker::Read, clock);

        let mut preprocess_map = None;
        if let Some(preprocessor) = &self.preprocessor {
            trace.record(StageMarker::PreprocessStart, clock);
            let output = preprocessor
                .preprocess(&source, &filename)
                .await
                .map_err(|err| PipelineError::Preprocess {
                    path: filename.clone(),
                    message: err.message,
                })?;
            trace.record(StageMarker::Preprocessed, clock);
            source = output.code;
            preprocess_map = output.map;
        }

        // Dynamic option cost is folded into the interval leading up to
        // compile_start; it gets no markers of its own.
        let options = match &self.options_resolver {
            Some(resolver) => match resolver.resolve(&filename).await {
                Some(per_file) => self.base_options.merged_with(&per_file),
                None => self.base_options.clone(),
            },
            None => self.base_options.clone(),
        };

        trace.record(StageMarker::CompileStart, clock);
        let compiled = self.compiler.compile(&source, &options, &filename)?;
        trace.record(StageMarker::Compiled, clock);

        // The compiler's map already accounts for preprocessing when the
        // collaborator chains them; the preprocess map only stands in when
        // the compiler produced none.
        let map = compiled.map.or(preprocess_map);
        let contents = render_module(compiled.code, map, self.map_style, path);
        trace.record(StageMarker::End, clock);

        debug!(
            path = %filename,
            events = trace.events().len(),
            "transformed component file"
        );
        ctx.append(FileRecord::new(filename, trace));
        Ok(TransformOutput { contents })
    }
}

/// Merge compiled code and its source map into the module contents handed
/// back to the host's module loader.
///
/// The `<code>\n//# sourceMappingURL=<url>` shape is a compatibility
/// contract with the host and must not be altered. A compile without any
/// map yields the bare code.
fn render_module(code: String, map: Option<SourceMap>, style: MapStyle, path: &Path) -> String {
    let Some(map) = map else {
        return code;
    };
    let url = match style {
        MapStyle::Inline => map.into_inline_url(),
        MapStyle::External => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            format!("{name}.map")
        }
    };
    format!("{code}\n//# sourceMappingURL={url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{CompileOutput, PreprocessOutput};
    use crate::error::{CompileError, PreprocessError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::io::Write;

    struct OkCompiler;

    impl Compiler for OkCompiler {
        fn compile(
            &self,
            source: &str,
            options: &CompileOptions,
            _filename: &str,
        ) -> Result<CompileOutput, CompileError> {
            let dev = options
                .0
                .get("dev")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            Ok(CompileOutput {
                code: format!("/* dev={dev} */ export default {source:?};"),
                map: Some(SourceMap(json!({"version": 3}))),
            })
        }
    }

    struct FailingCompiler;

    impl Compiler for FailingCompiler {
        fn compile(
            &self,
            _source: &str,
            _options: &CompileOptions,
            _filename: &str,
        ) -> Result<CompileOutput, CompileError> {
            Err(CompileError {
                message: "unexpected token".to_string(),
                line: Some(1),
                column: Some(0),
            })
        }
    }

    struct UppercasePreprocessor;

    #[async_trait]
    impl Preprocessor for UppercasePreprocessor {
        async fn preprocess(
            &self,
            source: &str,
            _filename: &str,
        ) -> Result<PreprocessOutput, PreprocessError> {
            Ok(PreprocessOutput {
                code: source.to_uppercase(),
                map: None,
            })
        }
    }

    struct RejectingPreprocessor;

    #[async_trait]
    impl Preprocessor for RejectingPreprocessor {
        async fn preprocess(
            &self,
            _source: &str,
            _filename: &str,
        ) -> Result<PreprocessOutput, PreprocessError> {
            Err(PreprocessError::message("bad syntax"))
        }
    }

    fn fixture_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".svelte")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn runner(
        preprocessor: Option<Arc<dyn Preprocessor>>,
        compiler: Arc<dyn Compiler>,
    ) -> PipelineRunner {
        PipelineRunner::new(
            compiler,
            preprocessor,
            None,
            CompileOptions::default(),
            MapStyle::Inline,
        )
    }

    #[tokio::test]
    async fn test_success_appends_record_with_full_trace() {
        let file = fixture_file("<h1>hi</h1>");
        let ctx = RunContext::begin();
        let runner = runner(Some(Arc::new(UppercasePreprocessor)), Arc::new(OkCompiler));

        let output = runner.transform_file(file.path(), &ctx).await.unwrap();
        assert!(output.contents.contains("//# sourceMappingURL=data:"));

        let records = ctx.finish();
        assert_eq!(records.len(), 1);
        let trace = &records[0].trace;
        let markers: Vec<StageMarker> = trace.events().iter().map(|e| e.marker).collect();
        assert_eq!(
            markers,
            vec![
                StageMarker::Start,
                StageMarker::Read,
                StageMarker::PreprocessStart,
                StageMarker::Preprocessed,
                StageMarker::CompileStart,
                StageMarker::Compiled,
                StageMarker::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_no_preprocessor_emits_no_preprocess_markers() {
        let file = fixture_file("<h1>hi</h1>");
        let ctx = RunContext::begin();
        let runner = runner(None, Arc::new(OkCompiler));

        runner.transform_file(file.path(), &ctx).await.unwrap();

        let records = ctx.finish();
        let trace = &records[0].trace;
        assert!(!trace.contains(StageMarker::PreprocessStart));
        assert!(!trace.contains(StageMarker::Preprocessed));
        assert!(trace.duration_to(StageMarker::Compiled, None).is_some());
    }

    #[tokio::test]
    async fn test_preprocess_rejection_is_enriched_and_appends_nothing() {
        let file = fixture_file("<h1>hi</h1>");
        let ctx = RunContext::begin();
        let runner = runner(Some(Arc::new(RejectingPreprocessor)), Arc::new(OkCompiler));

        let err = runner.transform_file(file.path(), &ctx).await.unwrap_err();
        let path = file.path().to_string_lossy();
        assert_eq!(
            err.to_string(),
            format!("Error while preprocessing {path} - bad syntax")
        );
        assert_eq!(ctx.record_count(), 0);
    }

    #[tokio::test]
    async fn test_compile_failure_appends_nothing() {
        let file = fixture_file("<h1>hi</h1>");
        let ctx = RunContext::begin();
        let runner = runner(None, Arc::new(FailingCompiler));

        let err = runner.transform_file(file.path(), &ctx).await.unwrap_err();
        assert!(matches!(err, PipelineError::Compile(_)));
        assert_eq!(ctx.record_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_a_read_error() {
        let ctx = RunContext::begin();
        let runner = runner(None, Arc::new(OkCompiler));

        let err = runner
            .transform_file(Path::new("/no/such/file.svelte"), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
        assert_eq!(ctx.record_count(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_options_are_merged() {
        struct DevResolver;

        #[async_trait]
        impl OptionsResolver for DevResolver {
            async fn resolve(&self, _filename: &str) -> Option<CompileOptions> {
                let mut map = serde_json::Map::new();
                map.insert("dev".into(), json!(true));
                Some(CompileOptions(map))
            }
        }

        let file = fixture_file("<h1>hi</h1>");
        let ctx = RunContext::begin();
        let runner = PipelineRunner::new(
            Arc::new(OkCompiler),
            None,
            Some(Arc::new(DevResolver)),
            CompileOptions::default(),
            MapStyle::Inline,
        );

        let output = runner.transform_file(file.path(), &ctx).await.unwrap();
        assert!(output.contents.contains("dev=true"));
    }

    #[test]
    fn test_external_map_reference() {
        let contents = render_module(
            "export {};".to_string(),
            Some(SourceMap(json!({"version": 3}))),
            MapStyle::External,
            Path::new("/dep/Button.svelte"),
        );
        assert_eq!(contents, "export {};\n//# sourceMappingURL=Button.svelte.map");
    }

    #[test]
    fn test_no_map_leaves_code_bare() {
        let contents = render_module(
            "export {};".to_string(),
            None,
            MapStyle::Inline,
            Path::new("/dep/Button.svelte"),
        );
        assert_eq!(contents, "export {};");
    }
}

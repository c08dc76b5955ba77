//! Collaborator Boundaries
//!
//! The pipeline treats the component compiler, the preprocessor, dynamic
//! option computation, package-identity resolution, manifest reading, and
//! the report sink as external collaborators behind traits. The traits
//! capture exactly the interface the instrumentation depends on; the real
//! implementations live with the host integration.

use crate::error::{CompileError, PreprocessError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

/// Opaque compiler options.
///
/// The option set is supplied and validated externally; the pipeline only
/// threads it through and overlays per-file dynamic options on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions(pub serde_json::Map<String, serde_json::Value>);

impl CompileOptions {
    /// Overlay `other` on top of these options, key by key. Keys present in
    /// `other` win.
    pub fn merged_with(&self, other: &CompileOptions) -> CompileOptions {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }
        CompileOptions(merged)
    }
}

/// A source map as produced by the compiler or preprocessor. Opaque JSON;
/// the pipeline only ever re-encodes it for the trailing directive.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap(pub serde_json::Value);

impl SourceMap {
    /// Render the map as an inline `data:` URL for a `sourceMappingURL`
    /// directive.
    pub fn into_inline_url(self) -> String {
        let encoded = STANDARD.encode(self.0.to_string());
        format!("data:application/json;charset=utf-8;base64,{encoded}")
    }
}

/// Output of a successful compile call.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Executable module source text.
    pub code: String,
    /// Source map for the compiled code, if the compiler produced one.
    pub map: Option<SourceMap>,
}

/// Output of a successful preprocess call.
#[derive(Debug, Clone)]
pub struct PreprocessOutput {
    /// Preprocessed component source, ready for the compiler.
    pub code: String,
    /// Source map for the preprocessing step, if one was produced.
    pub map: Option<SourceMap>,
}

/// The component compiler. Synchronous and non-suspending: it is expected
/// to complete without yielding, so its cost lands entirely inside the
/// compile stage's marker pair.
pub trait Compiler: Send + Sync {
    /// Compile preprocessed component source into executable module code.
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
        filename: &str,
    ) -> Result<CompileOutput, CompileError>;
}

/// The optional preprocessing step. Asynchronous; may reject.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Preprocess raw component source before compilation.
    async fn preprocess(
        &self,
        source: &str,
        filename: &str,
    ) -> Result<PreprocessOutput, PreprocessError>;
}

/// Optional per-file dynamic option computation, run between preprocessing
/// and compiling. Returns extra options to overlay on the configured base
/// set, or `None` to compile with the base set unchanged. Contributes no
/// events of its own.
#[async_trait]
pub trait OptionsResolver: Send + Sync {
    /// Compute per-file compile options.
    async fn resolve(&self, filename: &str) -> Option<CompileOptions>;
}

/// Package-identity resolution: closest-package-manifest lookup for a file
/// path. A lookup that fails resolves to `None`; the caller groups such
/// files under a distinguished key rather than dropping them.
#[async_trait]
pub trait PackageResolver: Send + Sync {
    /// Resolve the manifest path of the package owning `file`.
    async fn resolve_package_path(&self, file: &Path) -> Option<PathBuf>;
}

/// Reads a package manifest to obtain a display name. Absence of a name —
/// or any read/parse failure — yields `None`, and the caller falls back to
/// the manifest path itself.
#[async_trait]
pub trait ManifestReader: Send + Sync {
    /// The package's display name, if the manifest declares one.
    async fn display_name(&self, manifest_path: &Path) -> Option<String>;
}

/// Sink for the rendered report and the single-file hint. Plain text only;
/// this system has no direct file or network output.
pub trait ReportSink: Send + Sync {
    /// Emit one block of report text.
    fn emit(&self, text: &str);
}

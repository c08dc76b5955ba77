//! Package Identity Resolution
//!
//! After a run ends, every processed file is attributed to the package
//! that owns it: the resolver collaborator finds the closest manifest, the
//! manifest reader extracts a display name, and anything that fails along
//! the way degrades instead of aborting — an unresolvable file lands in
//! the "unknown" group, a nameless manifest is displayed by its path.

use async_trait::async_trait;
use prebundle_core::{ManifestReader, PackageResolver, ReportSink};
use prebundle_stats::UNKNOWN_GROUP_KEY;
use std::path::Path;
use tracing::{debug, info};

/// A file's resolved package attribution.
#[derive(Debug, Clone)]
pub(crate) struct PackageIdentity {
    /// Aggregation join key: the manifest path, or the "unknown" key.
    pub key: String,
    /// Human-readable name for the report.
    pub display_name: String,
}

/// Resolve one file to its owning package. Never fails: lookup misses and
/// manifest problems degrade to the "unknown" group and path-based names.
pub(crate) async fn resolve_identity(
    resolver: &dyn PackageResolver,
    reader: &dyn ManifestReader,
    file_path: &str,
) -> PackageIdentity {
    match resolver.resolve_package_path(Path::new(file_path)).await {
        Some(manifest_path) => {
            let key = manifest_path.to_string_lossy().into_owned();
            let display_name = match reader.display_name(&manifest_path).await {
                Some(name) => name,
                None => key.clone(),
            };
            PackageIdentity { key, display_name }
        }
        None => {
            debug!(file = %file_path, "no package manifest found");
            PackageIdentity {
                key: UNKNOWN_GROUP_KEY.to_string(),
                display_name: UNKNOWN_GROUP_KEY.to_string(),
            }
        }
    }
}

/// Default manifest reader: parses the manifest as JSON and returns its
/// `name` field. Read or parse failures yield `None`, which callers turn
/// into the path fallback.
#[derive(Debug, Default)]
pub struct FsManifestReader;

#[async_trait]
impl ManifestReader for FsManifestReader {
    async fn display_name(&self, manifest_path: &Path) -> Option<String> {
        let text = tokio::fs::read_to_string(manifest_path).await.ok()?;
        let manifest: serde_json::Value = serde_json::from_str(&text).ok()?;
        manifest
            .get("name")
            .and_then(|name| name.as_str())
            .map(|name| name.to_string())
    }
}

/// Default report sink: forwards report text to the `tracing` logger at
/// info level.
#[derive(Debug, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn emit(&self, text: &str) {
        info!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    struct FixedResolver(Option<PathBuf>);

    #[async_trait]
    impl PackageResolver for FixedResolver {
        async fn resolve_package_path(&self, _file: &Path) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    fn manifest_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_named_manifest_resolves_display_name() {
        let manifest = manifest_file(r#"{"name": "some-dep", "version": "1.0.0"}"#);
        let resolver = FixedResolver(Some(manifest.path().to_path_buf()));

        let identity =
            resolve_identity(&resolver, &FsManifestReader, "/dep/src/Button.svelte").await;
        assert_eq!(identity.display_name, "some-dep");
        assert_eq!(identity.key, manifest.path().to_string_lossy());
    }

    #[tokio::test]
    async fn test_nameless_manifest_falls_back_to_path() {
        let manifest = manifest_file("{}");
        let resolver = FixedResolver(Some(manifest.path().to_path_buf()));

        let identity =
            resolve_identity(&resolver, &FsManifestReader, "/dep/src/Button.svelte").await;
        assert_eq!(identity.display_name, manifest.path().to_string_lossy());
    }

    #[tokio::test]
    async fn test_unreadable_manifest_falls_back_to_path() {
        let resolver = FixedResolver(Some(PathBuf::from("/no/such/package.json")));

        let identity =
            resolve_identity(&resolver, &FsManifestReader, "/dep/src/Button.svelte").await;
        assert_eq!(identity.display_name, "/no/such/package.json");
        assert_eq!(identity.key, "/no/such/package.json");
    }

    #[tokio::test]
    async fn test_failed_lookup_groups_as_unknown() {
        let resolver = FixedResolver(None);

        let identity =
            resolve_identity(&resolver, &FsManifestReader, "/dep/src/Button.svelte").await;
        assert_eq!(identity.key, UNKNOWN_GROUP_KEY);
        assert_eq!(identity.display_name, UNKNOWN_GROUP_KEY);
    }
}

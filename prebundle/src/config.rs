//! Plugin Configuration
//!
//! Host-facing configuration for the prebundling plugin: which file
//! extensions to intercept, the base compiler options, how the source-map
//! directive is emitted, and whether the end-of-run report is wanted.

use prebundle_core::{CompileOptions, MapStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the emitted module refers to its source map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMapStyle {
    /// Inline `data:` URL (default).
    #[default]
    Inline,
    /// Reference to a sibling `.map` file.
    External,
}

impl From<SourceMapStyle> for MapStyle {
    fn from(style: SourceMapStyle) -> Self {
        match style {
            SourceMapStyle::Inline => MapStyle::Inline,
            SourceMapStyle::External => MapStyle::External,
        }
    }
}

/// Configuration for one plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// File extensions the plugin intercepts, with leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Base compiler options, passed through opaquely. Validated by the
    /// compiler collaborator, not here.
    #[serde(default)]
    pub compile_options: serde_json::Map<String, serde_json::Value>,
    /// Source-map directive style for emitted modules.
    #[serde(default)]
    pub source_map: SourceMapStyle,
    /// Whether to emit the per-package performance report at run end.
    #[serde(default = "default_true")]
    pub emit_report: bool,
}

fn default_extensions() -> Vec<String> {
    vec![".svelte".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            compile_options: serde_json::Map::new(),
            source_map: SourceMapStyle::default(),
            emit_report: default_true(),
        }
    }
}

impl PluginConfig {
    /// Whether `path` falls inside the configured extension set.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// The configured base compile options.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions(self.compile_options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_component_extension() {
        let config = PluginConfig::default();
        assert!(config.matches(Path::new("/dep/src/Button.svelte")));
        assert!(!config.matches(Path::new("/dep/src/index.js")));
    }

    #[test]
    fn test_custom_extension_set() {
        let config = PluginConfig {
            extensions: vec![".svelte".into(), ".svx".into()],
            ..PluginConfig::default()
        };
        assert!(config.matches(Path::new("/docs/post.svx")));
        assert!(!config.matches(Path::new("/docs/post.md")));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: PluginConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.extensions, vec![".svelte".to_string()]);
        assert!(config.emit_report);
        assert_eq!(config.source_map, SourceMapStyle::Inline);

        let config: PluginConfig = serde_json::from_str(r#"{"source_map": "external"}"#).unwrap();
        assert_eq!(config.source_map, SourceMapStyle::External);
    }
}

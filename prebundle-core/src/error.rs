//! Pipeline Error Taxonomy
//!
//! Every per-file failure is a value returned to the caller, never a panic
//! across the plugin boundary: one broken file aborts only its own
//! processing. Failures convert into the host's diagnostic shape so the
//! bundler can surface them at the reported location.

use thiserror::Error;

/// Structured error thrown by the compiler collaborator.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    /// Compiler message text.
    pub message: String,
    /// 1-based line of the offending source position, when known.
    pub line: Option<u32>,
    /// 0-based column of the offending source position, when known.
    pub column: Option<u32>,
}

impl CompileError {
    /// A compile error with no source position.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

/// Rejection from the preprocessor collaborator.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PreprocessError {
    /// Preprocessor message text.
    pub message: String,
}

impl PreprocessError {
    /// A preprocess error carrying the given message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A failure while transforming one file. Aborts instrumentation for that
/// file only; no record is appended for it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the unreadable file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The preprocessor rejected the file. The message carries the file
    /// path and stage context so the diagnostic is actionable without the
    /// event trace.
    #[error("Error while preprocessing {path} - {message}")]
    Preprocess {
        /// Path of the file being preprocessed.
        path: String,
        /// The preprocessor's own message.
        message: String,
    },

    /// The compiler threw.
    #[error("{0}")]
    Compile(#[from] CompileError),
}

impl PipelineError {
    /// Convert into the host's diagnostic shape.
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        match self {
            PipelineError::Compile(err) => Diagnostic {
                text: err.message.clone(),
                file: Some(file.to_string()),
                line: err.line,
                column: err.column,
            },
            other => Diagnostic {
                text: other.to_string(),
                file: Some(file.to_string()),
                line: None,
                column: None,
            },
        }
    }
}

/// Compiler-style diagnostic in the shape the host's diagnostics channel
/// expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message.
    pub text: String,
    /// File the diagnostic points at.
    pub file: Option<String>,
    /// 1-based line, when known.
    pub line: Option<u32>,
    /// 0-based column, when known.
    pub column: Option<u32>,
}

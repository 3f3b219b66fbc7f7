//! Error types for godep.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while analyzing a module and producing its node graph.
#[derive(Debug, Error)]
pub enum GodepError {
    /// No `go.mod` encloses the analyzed directory.
    #[error("go.mod unresolved for directory {}", dir.display())]
    ModuleUnresolved { dir: PathBuf },

    /// The directory walk failed; a partial graph would be misleading.
    #[error("error walking {} at {}: {source}", root.display(), path.display())]
    Walk {
        root: PathBuf,
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be parsed. Callers skip the file.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("failed to load Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The external graph renderer could not produce an image.
    #[error("renderer `{command}` failed: {reason}")]
    Render { command: String, reason: String },
}

impl GodepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GodepError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GodepError>;

//! Error types for storage operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem or archive failure, with what was being attempted
    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The design XML could not be decoded; `path` is the element chain
    #[error("Malformed document at {path}: {message}")]
    MalformedDocument { path: String, message: String },

    /// `line` is 1-based; 0 when the manifest itself is missing
    #[error("Malformed manifest at line {line}: {message}")]
    MalformedManifest { line: usize, message: String },

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Menu model error: {0}")]
    Model(#[from] menu_model::MenuModelError),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Folds I/O and archive errors into [`StoreError::Io`] with context
pub(crate) trait IoContext<T> {
    fn io_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|e| StoreError::io(context(), e))
    }
}

impl<T> IoContext<T> for zip::result::ZipResult<T> {
    fn io_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|e| match e {
            zip::result::ZipError::Io(io) => StoreError::io(context(), io),
            other => StoreError::io(context(), std::io::Error::other(other)),
        })
    }
}

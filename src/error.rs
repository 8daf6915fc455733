//! Unified error types for album-tidy.
//!
//! Provides a single [`Error`] enum covering every failure the engine can
//! surface, plus a [`ResultExt`] trait for attaching context.
//!
//! # Fatal vs. reported
//!
//! Only [`Error::StoreUnavailable`] and configuration errors abort a run.
//! Everything else is handed to the reporter and the walk carries on:
//!
//! ```ignore
//! if let Err(e) = move_file(&from, &to) {
//!     reporter.error(&e.to_string());
//! }
//! ```

use std::path::PathBuf;

use crate::tags::Field;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A store root cannot be listed, created or reached
    #[error("Store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tags could not be read from a file
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Tags could not be written back to a file
    #[error("Writing tags to {path} failed: {}", messages.join("; "))]
    Write {
        path: PathBuf,
        messages: Vec<String>,
    },

    /// A copy or delete failed part way through a move
    #[error("Could not move {from} to {to}: {message}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    /// A tag needed to build a destination path is absent
    #[error("Missing {field} tag")]
    MissingTag { field: Field },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a store-unavailable error.
    pub fn store_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a write error from the writer's messages.
    pub fn write(path: impl Into<PathBuf>, messages: Vec<String>) -> Self {
        Self::Write {
            path: path.into(),
            messages,
        }
    }

    /// Create a move error.
    pub fn move_failed(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Move {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Messages to show under a failed tag write.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Write { messages, .. } => messages.clone(),
            Self::WithContext { source, .. } => source.messages(),
            other => vec![other.to_string()],
        }
    }

    /// Whether this error should stop the whole run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::StoreUnavailable { .. } | Self::Config(_) => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_lists_messages() {
        let err = Error::write(
            "/music/a.mp3",
            vec!["read only".to_string(), "bad frame".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains("a.mp3"));
        assert!(msg.contains("read only; bad frame"));
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::metadata("/music/a.mp3", "no tag").context("while reading album");
        let msg = err.to_string();
        assert!(msg.contains("while reading album"));
        assert!(msg.contains("no tag"));
    }

    #[test]
    fn test_missing_tag_names_field() {
        let err = Error::MissingTag {
            field: Field::Band,
        };
        assert_eq!(err.to_string(), "Missing band tag");
    }

    #[test]
    fn test_store_unavailable_is_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(Error::store_unavailable("/music", io).is_fatal());
        assert!(Error::config("bad").context("loading").is_fatal());
        assert!(!Error::move_failed("/a", "/b", "disk full").is_fatal());
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let with_ctx = result.with_context("copying file");
        assert!(with_ctx.unwrap_err().to_string().contains("copying file"));
    }
}

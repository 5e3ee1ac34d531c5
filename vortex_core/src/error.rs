//! Error types for vortex_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using vortex_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing, placing or pruning.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A root directory could not be opened.
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A category directory could not be created.
    #[error("Cannot create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be moved into the destination tree.
    #[error("Cannot place {path} ({stage}): {reason}")]
    Placement {
        path: PathBuf,
        stage: &'static str,
        reason: String,
    },

    /// An empty directory could not be removed.
    #[error("Cannot prune {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The invocation itself is unusable.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Unsupported algorithm.
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },
}

impl Error {
    /// Create a DirectoryUnreadable error.
    pub fn directory_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::DirectoryUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a DirectoryCreate error.
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Create a Placement error.
    pub fn placement(
        path: impl Into<PathBuf>,
        stage: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Error::Placement {
            path: path.into(),
            stage,
            reason: reason.into(),
        }
    }

    /// Create a Prune error.
    pub fn prune(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Prune {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedAlgorithm error.
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Everything else is per-file: logged, the entry left where it is, and
    /// traversal continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DirectoryUnreadable { .. }
                | Error::InvalidArgument { .. }
                | Error::UnsupportedAlgorithm { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let unreadable = Error::directory_unreadable(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(unreadable.is_fatal());
        assert!(Error::invalid_argument("bad").is_fatal());

        assert!(!Error::placement("/a/b.txt", "move", "boom").is_fatal());
        assert!(!Error::directory_create("/d", std::io::Error::other("x")).is_fatal());
        assert!(!Error::prune("/d", std::io::Error::other("x")).is_fatal());
    }

    #[test]
    fn test_placement_message() {
        let err = Error::placement("/in/a.txt", "sanitize", "target exists");
        assert_eq!(
            err.to_string(),
            "Cannot place /in/a.txt (sanitize): target exists"
        );
    }
}

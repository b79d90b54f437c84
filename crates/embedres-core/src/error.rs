//! Error types for embedded resource bundles.
//!
//! Lifecycle misuse (double registration, teardown without registration) and
//! malformed bundle bytes are reported here. Lookups that miss a path surface
//! as [`EmbedError::NotFound`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the embedres library.
#[derive(Debug, Error)]
pub enum EmbedError {
    // Lifecycle errors
    #[error("Resource bundle is already registered")]
    AlreadyRegistered,

    #[error("Resource bundle is not registered")]
    NotRegistered,

    #[error("Load hook failed: {message}")]
    HookFailed { message: String },

    // Lookup errors
    #[error("The resource at \"{path}\" does not exist")]
    NotFound { path: String },

    // Format errors
    #[error("Invalid resource bundle: {message}")]
    InvalidFormat { message: String },

    #[error("Unsupported bundle format version {0}")]
    UnsupportedVersion(u32),

    #[error("Resource at \"{path}\" failed to decompress: {message}")]
    Decompress {
        path: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Registry lock poisoned")]
    Poisoned,
}

/// Result type alias for embedres operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

impl From<std::io::Error> for EmbedError {
    fn from(err: std::io::Error) -> Self {
        EmbedError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl EmbedError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        EmbedError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        EmbedError::InvalidFormat {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        EmbedError::NotFound { path: path.into() }
    }

    /// True for errors caused by calling lifecycle operations out of order.
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            EmbedError::AlreadyRegistered | EmbedError::NotRegistered
        )
    }

    /// True when the lookup simply missed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EmbedError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbedError::not_found("/io/missing.css");
        assert_eq!(
            err.to_string(),
            "The resource at \"/io/missing.css\" does not exist"
        );

        let err = EmbedError::UnsupportedVersion(3);
        assert_eq!(err.to_string(), "Unsupported bundle format version 3");
    }

    #[test]
    fn test_lifecycle_violation() {
        assert!(EmbedError::AlreadyRegistered.is_lifecycle_violation());
        assert!(EmbedError::NotRegistered.is_lifecycle_violation());
        assert!(!EmbedError::Poisoned.is_lifecycle_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EmbedError = io_err.into();
        assert!(matches!(err, EmbedError::Io { path: None, .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = EmbedError::io_with_path(io_err, "/tmp/bundle.gresource");
        assert!(matches!(err, EmbedError::Io { path: Some(_), .. }));
    }
}

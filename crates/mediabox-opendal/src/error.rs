//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// File or object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Object size does not fit the size column.
    #[error("object too large: {0}")]
    TooLarge(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Returns whether the error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

impl From<StorageError> for mediabox_core::Error {
    fn from(err: StorageError) -> Self {
        let message = match &err {
            StorageError::Init(_) => "storage backend unavailable",
            StorageError::NotFound(_) => "object not found",
            StorageError::PermissionDenied(_) => "permission denied",
            StorageError::TooLarge(_) => "object too large",
            StorageError::Backend(_) => "storage operation failed",
        };
        mediabox_core::Error::backend(message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_opendal_kinds() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "gone");
        assert!(StorageError::from(err).is_not_found());

        let err = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from(err),
            StorageError::PermissionDenied(_)
        ));
    }

    #[test]
    fn converts_into_backend_error() {
        let err: mediabox_core::Error = StorageError::not_found("/a").into();
        assert_eq!(err.kind(), mediabox_core::ErrorKind::Backend);
        assert!(std::error::Error::source(&err).is_some());
    }
}

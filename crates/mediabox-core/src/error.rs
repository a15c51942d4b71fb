//! Common error type definitions.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source of backend and store failures, which are passed through
/// opaquely from the underlying driver.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in mediabox operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The owner already has a media box.
    BoxAlreadyExists,
    /// The owner has no media box.
    BoxNotFound,
    /// Storing the content would exceed the box capacity.
    QuotaExceeded,
    /// The content type is absent from the configured MIME map.
    UnsupportedMimeType,
    /// The uploaded content could not be decoded.
    InvalidContent,
    /// Content with the same logical name already exists in the directory.
    DuplicateContent,
    /// A filter condition references an unknown field or carries a bad value.
    InvalidFilter,
    /// Configuration is missing or invalid.
    Configuration,
    /// Byte-storage backend failure.
    Backend,
    /// Persistent store failure.
    Store,
}

/// Errors raised by media box operations.
///
/// Variants carry the structured context (owner, sizes, MIME type) an API
/// layer needs to render a message; no formatting beyond `Display` happens here.
#[derive(Debug, Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// A media box already exists for the owner.
    #[error("media box already exists for owner '{owner_id}'")]
    BoxAlreadyExists { owner_id: String },

    /// No media box exists for the owner.
    #[error("media box not found for owner '{owner_id}'")]
    BoxNotFound { owner_id: String },

    /// The post-write capacity check failed.
    #[error("media box quota exceeded: {used_size} + {new_size} bytes exceeds {max_size} bytes")]
    QuotaExceeded {
        box_id: uuid::Uuid,
        used_size: i64,
        new_size: i64,
        max_size: i64,
    },

    /// The content type has no extension mapping.
    #[error("unsupported mime type '{mime_type}'")]
    UnsupportedMimeType { mime_type: String },

    /// The content could not be decoded as an image.
    #[error("invalid content: {message}")]
    InvalidContent {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// The (subdirectory, filename) pair is already taken within the box.
    #[error("content '{filename}' already exists in '{}'", subdirectory.as_deref().unwrap_or(""))]
    DuplicateContent {
        subdirectory: Option<String>,
        filename: String,
    },

    /// A filter condition could not be applied.
    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Byte-storage backend error, passed through opaquely.
    #[error("storage backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// Persistent store error, passed through opaquely.
    #[error("store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl Error {
    /// Creates a new invalid content error.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new invalid filter error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to variants that carry one.
    ///
    /// Variants without a source slot are returned unchanged.
    pub fn with_source(mut self, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        match &mut self {
            Self::InvalidContent { source, .. }
            | Self::Backend { source, .. }
            | Self::Store { source, .. } => *source = Some(Box::new(error)),
            _ => {}
        }
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BoxAlreadyExists { .. } => ErrorKind::BoxAlreadyExists,
            Self::BoxNotFound { .. } => ErrorKind::BoxNotFound,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::UnsupportedMimeType { .. } => ErrorKind::UnsupportedMimeType,
            Self::InvalidContent { .. } => ErrorKind::InvalidContent,
            Self::DuplicateContent { .. } => ErrorKind::DuplicateContent,
            Self::InvalidFilter { .. } => ErrorKind::InvalidFilter,
            Self::Config { .. } => ErrorKind::Configuration,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Store { .. } => ErrorKind::Store,
        }
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_snake_case() {
        let err = Error::UnsupportedMimeType {
            mime_type: "text/plain".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedMimeType);
        assert_eq!(err.kind_str(), "unsupported_mime_type");
    }

    #[test]
    fn quota_message_carries_sizes() {
        let err = Error::QuotaExceeded {
            box_id: uuid::Uuid::nil(),
            used_size: 10,
            new_size: 5,
            max_size: 12,
        };
        assert_eq!(
            err.to_string(),
            "media box quota exceeded: 10 + 5 bytes exceeds 12 bytes"
        );
    }

    #[test]
    fn with_source_only_touches_source_slots() {
        let io = std::io::Error::other("disk on fire");
        let err = Error::backend("write failed").with_source(io);
        assert!(std::error::Error::source(&err).is_some());

        let io = std::io::Error::other("ignored");
        let err = Error::config("bad prefix").with_source(io);
        assert!(std::error::Error::source(&err).is_none());
    }
}

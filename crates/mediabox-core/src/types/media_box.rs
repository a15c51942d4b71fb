use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::path::combine;

/// Length of the directory name derived from an owner identifier.
const DIRECTORY_HASH_LENGTH: usize = 32;

/// A per-owner storage container with a capacity quota.
///
/// The used size is deliberately absent: it is always computed from the
/// current content set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBox {
    /// Unique box identifier.
    pub id: Uuid,
    /// Owner identifier, unique across boxes.
    pub owner_id: String,
    /// Root directory name below the configured prefix, unique across boxes.
    pub directory: String,
    /// Explicit capacity in bytes.
    pub max_size: Option<i64>,
    /// Account that created the box.
    pub created_by: Option<String>,
    /// Account that last updated the box.
    pub updated_by: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

impl MediaBox {
    /// Returns the capacity, falling back to the system default.
    #[inline]
    pub fn effective_max_size(&self, default_max_size: i64) -> i64 {
        self.max_size.unwrap_or(default_max_size)
    }

    /// Returns the absolute root path of the box below `prefix`.
    pub fn root_path(&self, prefix: &str) -> String {
        combine([prefix, self.directory.as_str()])
    }
}

/// Data for creating a new box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMediaBox {
    /// Owner identifier.
    pub owner_id: String,
    /// Root directory name.
    pub directory: String,
    /// Explicit capacity in bytes.
    pub max_size: Option<i64>,
    /// Account creating the box.
    pub created_by: Option<String>,
}

impl NewMediaBox {
    /// Creates box data for an owner with the derived default directory.
    pub fn new(owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        Self {
            directory: default_directory(&owner_id),
            owner_id,
            max_size: None,
            created_by: None,
        }
    }

    /// Overrides the root directory. Blank values keep the default.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        if let Some(directory) = crate::path::trim_segment(&directory.into()) {
            self.directory = directory;
        }
        self
    }

    /// Sets an explicit capacity.
    pub fn with_max_size(mut self, max_size: i64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Records the creating account.
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }
}

/// Derives a stable directory name from an owner identifier.
pub fn default_directory(owner_id: &str) -> String {
    let digest = Sha256::digest(owner_id.as_bytes());
    let mut directory = hex::encode(digest);
    directory.truncate(DIRECTORY_HASH_LENGTH);
    directory
}

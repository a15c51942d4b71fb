use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::combine;

/// Metadata of one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContent {
    /// Unique content identifier.
    pub id: Uuid,
    /// Owning box.
    pub media_box_id: Uuid,
    /// Subdirectory below the box root, without surrounding separators.
    pub subdirectory: Option<String>,
    /// Original filename, empty when the source had none.
    pub filename: String,
    /// Size in bytes as reported by the storage backend.
    pub size: i64,
    /// Pixel width.
    pub width: Option<i32>,
    /// Pixel height.
    pub height: Option<i32>,
    /// MIME type.
    pub content_type: String,
    /// Opaque identifier used as the stored file name.
    ///
    /// Only absent between row creation and identifier assignment.
    pub uri: Option<String>,
    /// Upload time.
    pub uploaded_at: Timestamp,
    /// Account that uploaded the content.
    pub created_by: Option<String>,
    /// Account that last updated the record.
    pub updated_by: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

impl MediaContent {
    /// Returns the storage path below a box root path.
    pub fn path_in(&self, root_path: &str) -> String {
        combine([
            root_path,
            self.subdirectory.as_deref().unwrap_or_default(),
            self.uri.as_deref().unwrap_or_default(),
        ])
    }

    /// Returns whether the content has pixel dimensions.
    pub fn is_image(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

/// Data for creating a content record.
///
/// Size and identifier are not part of it: both are assigned by the upload
/// pipeline once the record exists and its bytes are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMediaContent {
    /// Owning box.
    pub media_box_id: Uuid,
    /// Subdirectory below the box root.
    pub subdirectory: Option<String>,
    /// Original filename.
    pub filename: String,
    /// Pixel width.
    pub width: Option<i32>,
    /// Pixel height.
    pub height: Option<i32>,
    /// MIME type.
    pub content_type: String,
    /// Upload time.
    pub uploaded_at: Timestamp,
    /// Uploading account.
    pub created_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_root_subdirectory_and_uri() {
        let now = Timestamp::now();
        let mut content = MediaContent {
            id: Uuid::nil(),
            media_box_id: Uuid::nil(),
            subdirectory: Some("20240501".into()),
            filename: "cat.png".into(),
            size: 0,
            width: Some(1),
            height: Some(1),
            content_type: "image/png".into(),
            uri: Some("abc.png".into()),
            uploaded_at: now,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(content.path_in("/mbox/dir"), "/mbox/dir/20240501/abc.png");
        content.subdirectory = None;
        assert_eq!(content.path_in("/mbox/dir"), "/mbox/dir/abc.png");
        assert!(content.is_image());
    }
}

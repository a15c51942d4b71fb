//! Media content model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::media_contents;

/// Media content model representing one stored file.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = media_contents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MediaContent {
    /// Unique content identifier.
    pub id: Uuid,
    /// Reference to the owning box.
    pub media_box_id: Uuid,
    /// Subdirectory below the box root.
    pub subdirectory: Option<String>,
    /// Original filename, empty when unknown.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
    /// Pixel width.
    pub width: Option<i32>,
    /// Pixel height.
    pub height: Option<i32>,
    /// MIME type.
    pub content_type: String,
    /// Opaque identifier used as the stored file name.
    pub uri: Option<String>,
    /// Timestamp when the content was uploaded.
    pub uploaded_at: Timestamp,
    /// Uploading account.
    pub created_by: Option<String>,
    /// Account that last updated the record.
    pub updated_by: Option<String>,
    /// Timestamp when the record was created.
    pub created_at: Timestamp,
    /// Timestamp when the record was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new content record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = media_contents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMediaContent {
    /// Owning box.
    pub media_box_id: Uuid,
    /// Subdirectory.
    pub subdirectory: Option<String>,
    /// Original filename.
    pub filename: String,
    /// Pixel width.
    pub width: Option<i32>,
    /// Pixel height.
    pub height: Option<i32>,
    /// MIME type.
    pub content_type: String,
    /// Upload timestamp.
    pub uploaded_at: Timestamp,
    /// Uploading account.
    pub created_by: Option<String>,
    /// Updating account, same as the uploader on insert.
    pub updated_by: Option<String>,
}

/// Data for updating a content record.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = media_contents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateMediaContent {
    /// Opaque identifier.
    pub uri: Option<String>,
    /// Size in bytes.
    pub size: Option<i64>,
    /// Update timestamp.
    pub updated_at: Option<Timestamp>,
}

impl UpdateMediaContent {
    /// Sets the identifier and refreshes the update timestamp.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            updated_at: Some(jiff::Timestamp::now().into()),
            ..Default::default()
        }
    }

    /// Sets the size and refreshes the update timestamp.
    pub fn size(size: i64) -> Self {
        Self {
            size: Some(size),
            updated_at: Some(jiff::Timestamp::now().into()),
            ..Default::default()
        }
    }
}

impl From<mediabox_core::types::NewMediaContent> for NewMediaContent {
    fn from(new_content: mediabox_core::types::NewMediaContent) -> Self {
        Self {
            media_box_id: new_content.media_box_id,
            subdirectory: new_content.subdirectory,
            filename: new_content.filename,
            width: new_content.width,
            height: new_content.height,
            content_type: new_content.content_type,
            uploaded_at: new_content.uploaded_at.into(),
            updated_by: new_content.created_by.clone(),
            created_by: new_content.created_by,
        }
    }
}

impl From<MediaContent> for mediabox_core::types::MediaContent {
    fn from(model: MediaContent) -> Self {
        Self {
            id: model.id,
            media_box_id: model.media_box_id,
            subdirectory: model.subdirectory,
            filename: model.filename,
            size: model.size,
            width: model.width,
            height: model.height,
            content_type: model.content_type,
            uri: model.uri,
            uploaded_at: model.uploaded_at.into(),
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_content_copies_uploader_into_updater() {
        let now = jiff::Timestamp::now();
        let new_content = NewMediaContent::from(mediabox_core::types::NewMediaContent {
            media_box_id: Uuid::nil(),
            subdirectory: Some("20240501".into()),
            filename: "cat.png".into(),
            width: Some(2),
            height: Some(3),
            content_type: "image/png".into(),
            uploaded_at: now,
            created_by: Some("alice".into()),
        });

        assert_eq!(new_content.updated_by.as_deref(), Some("alice"));
        assert_eq!(jiff::Timestamp::from(new_content.uploaded_at), now);
    }

    #[test]
    fn size_update_leaves_uri_untouched() {
        let update = UpdateMediaContent::size(42);
        assert_eq!(update.size, Some(42));
        assert!(update.uri.is_none());
        assert!(update.updated_at.is_some());
    }
}

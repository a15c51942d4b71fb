//! Media box model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::media_boxes;

/// Media box model representing one owner's storage container.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = media_boxes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MediaBox {
    /// Unique box identifier.
    pub id: Uuid,
    /// Owner identifier.
    pub owner_id: String,
    /// Root directory name.
    pub directory: String,
    /// Explicit capacity in bytes.
    pub max_size: Option<i64>,
    /// Account that created the box.
    pub created_by: Option<String>,
    /// Account that last updated the box.
    pub updated_by: Option<String>,
    /// Timestamp when the box was created.
    pub created_at: Timestamp,
    /// Timestamp when the box was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new media box.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = media_boxes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMediaBox {
    /// Owner identifier.
    pub owner_id: String,
    /// Root directory name.
    pub directory: String,
    /// Explicit capacity in bytes.
    pub max_size: Option<i64>,
    /// Creating account.
    pub created_by: Option<String>,
    /// Updating account, same as the creator on insert.
    pub updated_by: Option<String>,
}

/// Data for updating a media box.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = media_boxes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateMediaBox {
    /// Explicit capacity in bytes.
    pub max_size: Option<Option<i64>>,
    /// Updating account.
    pub updated_by: Option<Option<String>>,
    /// Update timestamp.
    pub updated_at: Option<Timestamp>,
}

impl From<mediabox_core::types::NewMediaBox> for NewMediaBox {
    fn from(new_box: mediabox_core::types::NewMediaBox) -> Self {
        Self {
            owner_id: new_box.owner_id,
            directory: new_box.directory,
            max_size: new_box.max_size,
            updated_by: new_box.created_by.clone(),
            created_by: new_box.created_by,
        }
    }
}

impl From<MediaBox> for mediabox_core::types::MediaBox {
    fn from(model: MediaBox) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            directory: model.directory,
            max_size: model.max_size,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

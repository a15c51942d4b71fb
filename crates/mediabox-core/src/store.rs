//! Persistent store abstraction.

use std::sync::Arc;

use uuid::Uuid;

use crate::Result;
use crate::filter::Predicate;
use crate::types::{MediaBox, MediaContent, NewMediaBox, NewMediaContent};

/// Shared, type-erased store handle.
pub type SharedStore = Arc<dyn MediaStore>;

/// Persistence of boxes and content records.
///
/// Implementations must enforce uniqueness of owner, directory, identifier
/// and non-empty `(box, subdirectory, filename)`, and must delete a box's
/// content records when the box is deleted. Uniqueness violations surface as
/// [`Error::BoxAlreadyExists`] and [`Error::DuplicateContent`].
///
/// [`Error::BoxAlreadyExists`]: crate::Error::BoxAlreadyExists
/// [`Error::DuplicateContent`]: crate::Error::DuplicateContent
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Inserts a new box.
    async fn create_media_box(&self, new_box: NewMediaBox) -> Result<MediaBox>;

    /// Finds a box by id.
    async fn find_media_box_by_id(&self, box_id: Uuid) -> Result<Option<MediaBox>>;

    /// Finds the box of an owner.
    async fn find_media_box_by_owner(&self, owner_id: &str) -> Result<Option<MediaBox>>;

    /// Deletes a box row together with its content rows.
    ///
    /// Returns whether a row was deleted.
    async fn delete_media_box(&self, box_id: Uuid) -> Result<bool>;

    /// Inserts a content record with zero size and no identifier.
    async fn create_media_content(&self, new_content: NewMediaContent) -> Result<MediaContent>;

    /// Sets the opaque identifier of a freshly created record.
    async fn assign_media_content_uri(&self, content_id: Uuid, uri: &str) -> Result<MediaContent>;

    /// Persists the final size of a record.
    async fn update_media_content_size(&self, content_id: Uuid, size: i64) -> Result<MediaContent>;

    /// Deletes a content record. Returns whether a row was deleted.
    async fn delete_media_content(&self, content_id: Uuid) -> Result<bool>;

    /// Finds a record of a box by its identifier.
    async fn find_media_content_by_uri(
        &self,
        box_id: Uuid,
        uri: &str,
    ) -> Result<Option<MediaContent>>;

    /// Lists the records of a box matching every predicate, newest first.
    async fn list_media_contents(
        &self,
        box_id: Uuid,
        predicates: &[Predicate],
    ) -> Result<Vec<MediaContent>>;

    /// Sums the sizes of the records of a box.
    async fn sum_media_content_sizes(&self, box_id: Uuid) -> Result<i64>;

    /// Counts the records of a box.
    async fn count_media_contents(&self, box_id: Uuid) -> Result<i64>;
}

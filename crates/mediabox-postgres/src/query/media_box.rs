//! Media box repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{MediaBox, NewMediaBox, UpdateMediaBox};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for media box database operations.
pub trait MediaBoxRepository {
    /// Creates a new media box record.
    fn create_media_box(
        &mut self,
        new_box: NewMediaBox,
    ) -> impl Future<Output = PgResult<MediaBox>> + Send;

    /// Finds a box by its unique identifier.
    fn find_media_box_by_id(
        &mut self,
        box_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<MediaBox>>> + Send;

    /// Finds the box of an owner.
    fn find_media_box_by_owner(
        &mut self,
        owner_id: &str,
    ) -> impl Future<Output = PgResult<Option<MediaBox>>> + Send;

    /// Updates a box.
    fn update_media_box(
        &mut self,
        box_id: Uuid,
        updates: UpdateMediaBox,
    ) -> impl Future<Output = PgResult<MediaBox>> + Send;

    /// Deletes a box; content rows go with it through the foreign key.
    ///
    /// Returns whether a row was deleted.
    fn delete_media_box(&mut self, box_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl MediaBoxRepository for PgConnection {
    async fn create_media_box(&mut self, new_box: NewMediaBox) -> PgResult<MediaBox> {
        use schema::media_boxes;

        let media_box = diesel::insert_into(media_boxes::table)
            .values(&new_box)
            .returning(MediaBox::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            box_id = %media_box.id,
            owner_id = %media_box.owner_id,
            "Media box created"
        );

        Ok(media_box)
    }

    async fn find_media_box_by_id(&mut self, box_id: Uuid) -> PgResult<Option<MediaBox>> {
        use schema::media_boxes::{self, dsl};

        media_boxes::table
            .filter(dsl::id.eq(box_id))
            .select(MediaBox::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_media_box_by_owner(&mut self, owner_id: &str) -> PgResult<Option<MediaBox>> {
        use schema::media_boxes::{self, dsl};

        media_boxes::table
            .filter(dsl::owner_id.eq(owner_id))
            .select(MediaBox::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_media_box(
        &mut self,
        box_id: Uuid,
        updates: UpdateMediaBox,
    ) -> PgResult<MediaBox> {
        use schema::media_boxes::{self, dsl};

        diesel::update(media_boxes::table.filter(dsl::id.eq(box_id)))
            .set(&updates)
            .returning(MediaBox::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_media_box(&mut self, box_id: Uuid) -> PgResult<bool> {
        use schema::media_boxes::{self, dsl};

        let deleted = diesel::delete(media_boxes::table.filter(dsl::id.eq(box_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}

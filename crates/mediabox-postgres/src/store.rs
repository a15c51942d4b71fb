//! [`MediaStore`] backed by PostgreSQL.

use mediabox_core::filter::Predicate;
use mediabox_core::store::MediaStore;
use mediabox_core::{Error, Result, types};
use uuid::Uuid;

use crate::model::{NewMediaBox, NewMediaContent, UpdateMediaContent};
use crate::query::{MediaBoxRepository, MediaContentRepository};
use crate::types::{ConstraintViolation, MediaBoxConstraints, MediaContentConstraints};
use crate::{PgClient, PgError, TRACING_TARGET_CLIENT};

/// Maps uniqueness violations onto the domain errors callers match on.
fn map_conflict(err: PgError, new_box: Option<&NewMediaBox>, new_content: Option<&NewMediaContent>) -> Error {
    match (err.constraint_violation(), new_box, new_content) {
        (
            Some(ConstraintViolation::MediaBox(MediaBoxConstraints::OwnerIdUnique)),
            Some(new_box),
            _,
        ) => Error::BoxAlreadyExists {
            owner_id: new_box.owner_id.clone(),
        },
        (
            Some(ConstraintViolation::MediaContent(MediaContentConstraints::FilenameUnique)),
            _,
            Some(new_content),
        ) => Error::DuplicateContent {
            subdirectory: new_content.subdirectory.clone(),
            filename: new_content.filename.clone(),
        },
        _ => err.into(),
    }
}

#[async_trait::async_trait]
impl MediaStore for PgClient {
    async fn create_media_box(&self, new_box: types::NewMediaBox) -> Result<types::MediaBox> {
        let new_box = NewMediaBox::from(new_box);
        let mut conn = self.get_connection().await?;

        match conn.create_media_box(new_box.clone()).await {
            Ok(media_box) => Ok(media_box.into()),
            Err(err) => Err(map_conflict(err, Some(&new_box), None)),
        }
    }

    async fn find_media_box_by_id(&self, box_id: Uuid) -> Result<Option<types::MediaBox>> {
        let mut conn = self.get_connection().await?;
        let media_box = conn.find_media_box_by_id(box_id).await?;
        Ok(media_box.map(Into::into))
    }

    async fn find_media_box_by_owner(&self, owner_id: &str) -> Result<Option<types::MediaBox>> {
        let mut conn = self.get_connection().await?;
        let media_box = conn.find_media_box_by_owner(owner_id).await?;
        Ok(media_box.map(Into::into))
    }

    async fn delete_media_box(&self, box_id: Uuid) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let deleted = conn.delete_media_box(box_id).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            box_id = %box_id,
            deleted,
            "Media box row deleted"
        );

        Ok(deleted)
    }

    async fn create_media_content(
        &self,
        new_content: types::NewMediaContent,
    ) -> Result<types::MediaContent> {
        let new_content = NewMediaContent::from(new_content);
        let mut conn = self.get_connection().await?;

        match conn.create_media_content(new_content.clone()).await {
            Ok(content) => Ok(content.into()),
            Err(err) => Err(map_conflict(err, None, Some(&new_content))),
        }
    }

    async fn assign_media_content_uri(
        &self,
        content_id: Uuid,
        uri: &str,
    ) -> Result<types::MediaContent> {
        let mut conn = self.get_connection().await?;
        let content = conn
            .update_media_content(content_id, UpdateMediaContent::uri(uri))
            .await?;
        Ok(content.into())
    }

    async fn update_media_content_size(
        &self,
        content_id: Uuid,
        size: i64,
    ) -> Result<types::MediaContent> {
        let mut conn = self.get_connection().await?;
        let content = conn
            .update_media_content(content_id, UpdateMediaContent::size(size))
            .await?;
        Ok(content.into())
    }

    async fn delete_media_content(&self, content_id: Uuid) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        Ok(conn.delete_media_content(content_id).await?)
    }

    async fn find_media_content_by_uri(
        &self,
        box_id: Uuid,
        uri: &str,
    ) -> Result<Option<types::MediaContent>> {
        let mut conn = self.get_connection().await?;
        let content = conn.find_media_content_by_uri(box_id, uri).await?;
        Ok(content.map(Into::into))
    }

    async fn list_media_contents(
        &self,
        box_id: Uuid,
        predicates: &[Predicate],
    ) -> Result<Vec<types::MediaContent>> {
        let mut conn = self.get_connection().await?;
        let contents = conn.list_media_contents(box_id, predicates).await?;
        Ok(contents.into_iter().map(Into::into).collect())
    }

    async fn sum_media_content_sizes(&self, box_id: Uuid) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        Ok(conn.sum_media_content_sizes(box_id).await?)
    }

    async fn count_media_contents(&self, box_id: Uuid) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        Ok(conn.count_media_contents(box_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_errors_become_store_errors() {
        let err = map_conflict(PgError::Unexpected("boom".into()), None, None);
        assert_eq!(err.kind(), mediabox_core::ErrorKind::Store);
    }
}

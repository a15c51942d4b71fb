//! Binding of owner entities to their media box.

use mediabox_core::types::{MediaBox, NewMediaBox};
use mediabox_core::{Error, RelationMode, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::TRACING_TARGET_OWNERSHIP;
use crate::service::MediaBoxService;

/// What happened to a box when its owner was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OwnerDeletion {
    /// The owner had no box.
    NoBox,
    /// Aggregation: the box and its content stay in place.
    Retained { box_id: Uuid },
    /// Composition: the box and its content were deleted.
    Deleted { box_id: Uuid },
}

/// Applies the configured relation mode to owner lifecycle events.
#[derive(Debug, Clone)]
pub struct OwnershipManager {
    service: MediaBoxService,
    mode: RelationMode,
}

impl OwnershipManager {
    /// Creates a manager using the service's relation mode.
    pub fn new(service: MediaBoxService) -> Self {
        let mode = service.config().relation_mode;
        Self { service, mode }
    }

    #[inline]
    pub fn mode(&self) -> RelationMode {
        self.mode
    }

    #[inline]
    pub fn service(&self) -> &MediaBoxService {
        &self.service
    }

    /// Returns whether the owner has a box.
    pub async fn has_box(&self, owner_id: &str) -> Result<bool> {
        Ok(self.service.media_box(owner_id).await?.is_some())
    }

    /// Returns the box of the owner, if any.
    pub async fn media_box(&self, owner_id: &str) -> Result<Option<MediaBox>> {
        self.service.media_box(owner_id).await
    }

    /// Returns the owner's box, creating it from `new_box` when missing.
    ///
    /// A concurrent creation for the same owner resolves to the box that won.
    pub async fn ensure_box(&self, new_box: NewMediaBox) -> Result<MediaBox> {
        let owner_id = new_box.owner_id.clone();
        if let Some(media_box) = self.service.media_box(&owner_id).await? {
            return Ok(media_box);
        }

        match self.service.create_box(new_box).await {
            Err(Error::BoxAlreadyExists { owner_id }) => self.service.require_box(&owner_id).await,
            result => result,
        }
    }

    /// Runs the relation mode for a deleted owner.
    #[tracing::instrument(skip(self), fields(mode = %self.mode))]
    pub async fn handle_owner_deleted(&self, owner_id: &str) -> Result<OwnerDeletion> {
        let Some(media_box) = self.service.media_box(owner_id).await? else {
            return Ok(OwnerDeletion::NoBox);
        };

        if !self.mode.cascades() {
            tracing::debug!(
                target: TRACING_TARGET_OWNERSHIP,
                box_id = %media_box.id,
                "Owner deleted, media box retained"
            );
            return Ok(OwnerDeletion::Retained {
                box_id: media_box.id,
            });
        }

        self.service.delete_box(&media_box).await?;

        tracing::info!(
            target: TRACING_TARGET_OWNERSHIP,
            box_id = %media_box.id,
            "Owner deleted, media box removed"
        );

        Ok(OwnerDeletion::Deleted {
            box_id: media_box.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;
    use mediabox_core::MediaBoxConfig;

    use super::*;
    use crate::imaging::tests::sample;
    use crate::service::tests::harness;
    use crate::upload::{UploadData, UploadRequest};

    fn config(mode: RelationMode) -> MediaBoxConfig {
        MediaBoxConfig::builder()
            .with_uri_salt("salt")
            .with_relation_mode(mode)
            .build()
            .unwrap()
    }

    async fn populated(manager: &OwnershipManager) -> Result<MediaBox> {
        let media_box = manager.ensure_box(NewMediaBox::new("owner")).await?;
        for name in ["a.png", "b.png"] {
            let data = UploadData::named(sample(4, 4, ImageFormat::Png), name);
            manager
                .service()
                .upload(&media_box, UploadRequest::new(data))
                .await?;
        }
        Ok(media_box)
    }

    #[tokio::test]
    async fn composition_cascades() -> Result<()> {
        let harness = harness(config(RelationMode::Composition));
        let manager = OwnershipManager::new(harness.service.clone());
        let media_box = populated(&manager).await?;

        let outcome = manager.handle_owner_deleted("owner").await?;
        assert_eq!(outcome, OwnerDeletion::Deleted { box_id: media_box.id });
        assert!(!manager.has_box("owner").await?);
        assert_eq!(harness.store.content_count().await, 0);
        assert_eq!(harness.storage.deleted().len(), 2);
        assert_eq!(harness.storage.deleted_directories().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn aggregation_retains() -> Result<()> {
        let harness = harness(config(RelationMode::Aggregation));
        let manager = OwnershipManager::new(harness.service.clone());
        let media_box = populated(&manager).await?;

        let outcome = manager.handle_owner_deleted("owner").await?;
        assert_eq!(outcome, OwnerDeletion::Retained { box_id: media_box.id });
        assert!(manager.has_box("owner").await?);
        assert_eq!(harness.store.content_count().await, 2);
        assert!(harness.storage.deleted().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn owner_without_box() -> Result<()> {
        let harness = harness(config(RelationMode::Composition));
        let manager = OwnershipManager::new(harness.service);

        assert!(!manager.has_box("nobody").await?);
        assert_eq!(manager.handle_owner_deleted("nobody").await?, OwnerDeletion::NoBox);
        Ok(())
    }

    #[test]
    fn deletion_outcome_serializes_tagged() -> serde_json::Result<()> {
        let value = serde_json::to_value(OwnerDeletion::Deleted { box_id: Uuid::nil() })?;
        assert_eq!(
            value,
            serde_json::json!({ "outcome": "deleted", "box_id": Uuid::nil() })
        );
        assert_eq!(
            serde_json::to_value(OwnerDeletion::NoBox)?,
            serde_json::json!({ "outcome": "no_box" })
        );
        Ok(())
    }

    #[tokio::test]
    async fn ensure_box_is_idempotent() -> Result<()> {
        let harness = harness(config(RelationMode::Aggregation));
        let manager = OwnershipManager::new(harness.service);

        let first = manager.ensure_box(NewMediaBox::new("owner").with_max_size(10)).await?;
        let second = manager.ensure_box(NewMediaBox::new("owner")).await?;
        assert_eq!(first, second);
        assert_eq!(manager.media_box("owner").await?, Some(first));
        assert_eq!(harness.store.box_count().await, 1);
        Ok(())
    }
}

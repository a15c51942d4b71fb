//! Box lifecycle, quota accounting and content lookup.

use bytes::Bytes;
use mediabox_core::filter::{self, FilterInput};
use mediabox_core::path::basename;
use mediabox_core::types::{MediaBox, NewMediaBox};
use mediabox_core::{Error, Result, format_size, usage_percent};

use crate::TRACING_TARGET_BOX;
use crate::content::ContentItem;
use crate::service::MediaBoxService;

impl MediaBoxService {
    /// Creates the box of an owner.
    ///
    /// The lookup before the insert only produces the early error; the
    /// store's owner uniqueness is what rejects concurrent creations.
    #[tracing::instrument(skip_all, fields(owner_id = %new_box.owner_id))]
    pub async fn create_box(&self, new_box: NewMediaBox) -> Result<MediaBox> {
        if self.store().find_media_box_by_owner(&new_box.owner_id).await?.is_some() {
            return Err(Error::BoxAlreadyExists {
                owner_id: new_box.owner_id,
            });
        }

        let media_box = self.store().create_media_box(new_box).await?;

        tracing::info!(
            target: TRACING_TARGET_BOX,
            box_id = %media_box.id,
            directory = %media_box.directory,
            "Media box created"
        );

        Ok(media_box)
    }

    /// Returns the box of an owner, if any.
    pub async fn media_box(&self, owner_id: &str) -> Result<Option<MediaBox>> {
        self.store().find_media_box_by_owner(owner_id).await
    }

    /// Returns the box of an owner or fails with `BoxNotFound`.
    pub async fn require_box(&self, owner_id: &str) -> Result<MediaBox> {
        self.media_box(owner_id)
            .await?
            .ok_or_else(|| Error::BoxNotFound {
                owner_id: owner_id.to_owned(),
            })
    }

    /// Sums the sizes of every item in the box.
    ///
    /// Always read from the store, never cached.
    pub async fn used_size(&self, media_box: &MediaBox) -> Result<i64> {
        self.store().sum_media_content_sizes(media_box.id).await
    }

    /// Returns the used share of the capacity in percent.
    pub async fn usage(&self, media_box: &MediaBox, precision: u32) -> Result<f64> {
        let used = self.used_size(media_box).await?;
        Ok(usage_percent(used, self.max_size(media_box), precision))
    }

    /// Returns the used size in human-readable form, e.g. `1.50 MB`.
    pub async fn used_size_formatted(&self, media_box: &MediaBox, precision: usize) -> Result<String> {
        Ok(format_size(self.used_size(media_box).await?, precision))
    }

    /// Counts the items in the box.
    pub async fn content_count(&self, media_box: &MediaBox) -> Result<i64> {
        self.store().count_media_contents(media_box.id).await
    }

    /// Lists the items of the box matching `filter`, newest first.
    ///
    /// Malformed clauses are ignored; unknown fields and values that do not
    /// fit their field fail with `InvalidFilter`.
    pub async fn search(
        &self,
        media_box: &MediaBox,
        filter: impl Into<FilterInput>,
    ) -> Result<Vec<ContentItem>> {
        let predicates = filter::predicates(filter)?;
        let records = self
            .store()
            .list_media_contents(media_box.id, &predicates)
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_BOX,
            box_id = %media_box.id,
            conditions = predicates.len(),
            matches = records.len(),
            "Searched media box"
        );

        Ok(records
            .into_iter()
            .map(|record| self.item(media_box, record))
            .collect())
    }

    /// Lists every item of the box, newest first.
    pub async fn contents(&self, media_box: &MediaBox) -> Result<Vec<ContentItem>> {
        self.search(media_box, FilterInput::default()).await
    }

    /// Resolves a stored path or URL to an item of the box.
    ///
    /// Returns `None` for empty values, values outside the box root and
    /// identifiers with no record.
    pub async fn find(&self, media_box: &MediaBox, path_or_url: &str) -> Result<Option<ContentItem>> {
        let path = self.translator().path_from_url_or_value(path_or_url.trim());
        let root = self.root_path(media_box);

        let within_root = path
            .strip_prefix(&root)
            .is_some_and(|rest| rest.starts_with('/'));
        if !within_root {
            return Ok(None);
        }

        let record = self
            .store()
            .find_media_content_by_uri(media_box.id, basename(&path))
            .await?;

        Ok(record.map(|record| self.item(media_box, record)))
    }

    /// Returns the stored bytes of an item.
    pub async fn read(&self, item: &ContentItem) -> Result<Bytes> {
        self.storage().read(item.path()).await
    }

    /// Deletes an item record and then its backing file.
    ///
    /// A file that is already gone counts as deleted. Records without an
    /// identifier never had a file written and only lose their row.
    #[tracing::instrument(skip_all, fields(content_id = %item.id))]
    pub async fn delete_content(&self, item: &ContentItem) -> Result<()> {
        self.store().delete_media_content(item.id).await?;
        if item.uri.is_none() {
            tracing::debug!(
                target: TRACING_TARGET_BOX,
                "Media content had no file, record deleted"
            );
            return Ok(());
        }

        self.storage().delete(item.path()).await?;

        tracing::debug!(
            target: TRACING_TARGET_BOX,
            path = %item.path(),
            "Media content deleted"
        );

        Ok(())
    }

    /// Removes the root directory of the box and everything below it.
    pub async fn delete_directory(&self, media_box: &MediaBox) -> Result<()> {
        self.storage().delete_directory(&self.root_path(media_box)).await
    }

    /// Deletes a box: every item with its file, then the box record, then
    /// the root directory.
    #[tracing::instrument(skip_all, fields(box_id = %media_box.id))]
    pub async fn delete_box(&self, media_box: &MediaBox) -> Result<()> {
        let items = self.contents(media_box).await?;
        let count = items.len();

        for item in &items {
            self.delete_content(item).await?;
        }

        self.store().delete_media_box(media_box.id).await?;
        self.delete_directory(media_box).await?;

        tracing::info!(
            target: TRACING_TARGET_BOX,
            owner_id = %media_box.owner_id,
            deleted_contents = count,
            "Media box deleted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;
    use jiff::Timestamp;
    use mediabox_core::ErrorKind;
    use mediabox_core::store::MediaStore;
    use mediabox_core::types::NewMediaContent;

    use crate::imaging::tests::sample;
    use crate::service::tests::{StorageEvent, default_harness};
    use crate::upload::{UploadData, UploadRequest};

    use super::*;

    fn png(filename: &str) -> UploadRequest {
        UploadRequest::new(UploadData::bytes(sample(8, 8, ImageFormat::Png))).with_filename(filename)
    }

    #[tokio::test]
    async fn one_box_per_owner() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;

        let media_box = service.create_box(NewMediaBox::new("owner-1")).await?;
        assert_eq!(service.media_box("owner-1").await?, Some(media_box));

        let err = service.create_box(NewMediaBox::new("owner-1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BoxAlreadyExists);
        assert_eq!(harness.store.box_count().await, 1);

        let err = service.require_box("owner-2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BoxNotFound);
        Ok(())
    }

    #[tokio::test]
    async fn used_size_tracks_contents() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service
            .create_box(NewMediaBox::new("owner").with_max_size(1_000_000))
            .await?;
        assert_eq!(service.used_size(&media_box).await?, 0);

        let a = service.upload(&media_box, png("a.png")).await?;
        let b = service.upload(&media_box, png("b.png")).await?;
        assert_eq!(service.used_size(&media_box).await?, a.size + b.size);
        assert_eq!(service.content_count(&media_box).await?, 2);

        let expected = usage_percent(a.size + b.size, 1_000_000, 3);
        assert_eq!(service.usage(&media_box, 3).await?, expected);
        assert_eq!(
            service.used_size_formatted(&media_box, 2).await?,
            format_size(a.size + b.size, 2)
        );

        service.delete_content(&a).await?;
        assert_eq!(service.used_size(&media_box).await?, b.size);
        Ok(())
    }

    #[tokio::test]
    async fn find_resolves_paths_and_urls() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;
        let item = service.upload(&media_box, png("a.png")).await?;

        assert_eq!(service.find(&media_box, item.path()).await?, Some(item.clone()));
        assert_eq!(service.find(&media_box, item.url()).await?, Some(item.clone()));
        assert_eq!(service.find(&media_box, "").await?, None);
        assert_eq!(service.find(&media_box, "/elsewhere/a.png").await?, None);

        let other = service.create_box(NewMediaBox::new("other")).await?;
        assert_eq!(service.find(&other, item.path()).await?, None);

        let missing = format!("{}/20240501/unknown.png", service.root_path(&media_box));
        assert_eq!(service.find(&media_box, &missing).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn search_filters_newest_first() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        service
            .upload(&media_box, png("old.png").with_uploaded_at_str("2024-01-01")?)
            .await?;
        service
            .upload(&media_box, png("new.png").with_uploaded_at_str("2024-06-01")?)
            .await?;

        let all = service.contents(&media_box).await?;
        let names: Vec<_> = all.iter().map(|item| item.filename.as_str()).collect();
        assert_eq!(names, ["new.png", "old.png"]);

        let recent = service
            .search(&media_box, "uploaded_at>=2024-03-01&content_type=image/png")
            .await?;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].filename, "new.png");

        let ignored = service.search(&media_box, "garbage&width>=8").await?;
        assert_eq!(ignored.len(), 2);

        let err = service.search(&media_box, "owner_id=1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFilter);
        Ok(())
    }

    #[tokio::test]
    async fn delete_box_removes_files_then_directory() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let mut paths = Vec::new();
        for name in ["a.png", "b.png", "c.png"] {
            paths.push(service.upload(&media_box, png(name)).await?.path().to_owned());
        }

        service.delete_box(&media_box).await?;

        let mut deleted = harness.storage.deleted();
        deleted.sort();
        paths.sort();
        assert_eq!(deleted, paths);

        let events = harness.storage.events();
        let deletions = &events[events.len() - 4..];
        assert!(
            deletions[..3]
                .iter()
                .all(|event| matches!(event, StorageEvent::Delete(_)))
        );
        assert_eq!(
            deletions[3],
            StorageEvent::DeleteDirectory(service.root_path(&media_box))
        );
        assert_eq!(harness.store.content_count().await, 0);
        assert_eq!(service.media_box("owner").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn delete_box_skips_files_of_unfinished_uploads() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;
        let stored = service.upload(&media_box, png("a.png")).await?;

        harness
            .store
            .create_media_content(NewMediaContent {
                media_box_id: media_box.id,
                subdirectory: Some("20240501".into()),
                filename: "pending.png".into(),
                width: None,
                height: None,
                content_type: "image/png".into(),
                uploaded_at: Timestamp::now(),
                created_by: None,
            })
            .await?;
        assert_eq!(harness.store.content_count().await, 2);

        service.delete_box(&media_box).await?;

        assert_eq!(harness.storage.deleted(), [stored.path().to_owned()]);
        assert_eq!(harness.store.content_count().await, 0);
        assert_eq!(service.media_box("owner").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn read_returns_stored_bytes() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let data = sample(8, 8, ImageFormat::Png);
        let item = service
            .upload(&media_box, UploadRequest::new(UploadData::bytes(data.clone())))
            .await?;
        assert_eq!(service.read(&item).await?, data);

        service.delete_content(&item).await?;
        assert!(service.read(&item).await.is_err());
        Ok(())
    }
}

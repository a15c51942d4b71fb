//! The upload pipeline.
//!
//! Content is decoded and normalized before anything is persisted, so
//! decoding and MIME failures leave no trace. Once the record exists every
//! failure rolls back both the record and the written file.

use std::path::PathBuf;

use bytes::Bytes;
use jiff::Timestamp;
use mediabox_core::image_text::ImageText;
use mediabox_core::path::trim_segment;
use mediabox_core::timestamp::{date_directory, parse_timestamp};
use mediabox_core::types::{MediaBox, MediaContent, NewMediaContent};
use mediabox_core::{Error, Result};
use uuid::Uuid;

use crate::TRACING_TARGET_UPLOAD;
use crate::content::ContentItem;
use crate::imaging::{self, ProcessedImage};
use crate::service::MediaBoxService;

/// Raw upload input.
#[derive(Debug, Clone)]
pub enum UploadData {
    /// In-memory bytes with the filename they arrived under, if any.
    Bytes {
        data: Bytes,
        filename: Option<String>,
    },
    /// A local file; its file name becomes the source filename.
    File(PathBuf),
    /// A `data:image/...;base64,` string.
    DataUrl(String),
}

impl UploadData {
    /// Bytes without a source filename.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes {
            data: data.into(),
            filename: None,
        }
    }

    /// Bytes uploaded under `filename`.
    pub fn named(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self::Bytes {
            data: data.into(),
            filename: Some(filename.into()),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn data_url(value: impl Into<String>) -> Self {
        Self::DataUrl(value.into())
    }

    /// Loads the bytes and the source filename.
    async fn load(self) -> Result<(Bytes, Option<String>)> {
        match self {
            Self::Bytes { data, filename } => Ok((data, filename)),
            Self::File(path) => {
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    Error::invalid_content(format!("cannot read '{}'", path.display()))
                        .with_source(e)
                })?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                Ok((Bytes::from(data), filename))
            }
            Self::DataUrl(value) => {
                let decoded = ImageText::decode(&value)?;
                Ok((Bytes::from(decoded.data), None))
            }
        }
    }
}

/// An upload into a box.
#[derive(Debug, Clone)]
#[must_use = "upload requests do nothing unless passed to MediaBoxService::upload"]
pub struct UploadRequest {
    pub data: UploadData,
    /// Overrides the source filename.
    pub filename: Option<String>,
    /// Directory below the box root; defaults to the upload day, `YYYYMMDD`.
    pub subdirectory: Option<String>,
    /// Defaults to the current time.
    pub uploaded_at: Option<Timestamp>,
    pub uploaded_by: Option<String>,
}

impl UploadRequest {
    pub fn new(data: UploadData) -> Self {
        Self {
            data,
            filename: None,
            subdirectory: None,
            uploaded_at: None,
            uploaded_by: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_subdirectory(mut self, subdirectory: impl Into<String>) -> Self {
        self.subdirectory = Some(subdirectory.into());
        self
    }

    pub fn with_uploaded_at(mut self, uploaded_at: Timestamp) -> Self {
        self.uploaded_at = Some(uploaded_at);
        self
    }

    /// Sets the upload time from an RFC 3339 or civil date(-time) string.
    pub fn with_uploaded_at_str(self, uploaded_at: &str) -> Result<Self> {
        Ok(self.with_uploaded_at(parse_timestamp(uploaded_at)?))
    }

    pub fn with_uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploaded_by.into());
        self
    }
}

impl MediaBoxService {
    /// Stores content in a box.
    ///
    /// The size recorded is the one the backend reports after the write.
    /// The quota is checked after that write, against the sizes committed
    /// at that moment: two concurrent uploads may both pass and leave the
    /// box above its capacity.
    ///
    /// # Errors
    ///
    /// `InvalidContent` and `UnsupportedMimeType` are raised before anything
    /// is written. `DuplicateContent`, `QuotaExceeded` and backend or store
    /// failures leave neither a record nor a file behind.
    #[tracing::instrument(skip_all, fields(box_id = %media_box.id))]
    pub async fn upload(&self, media_box: &MediaBox, request: UploadRequest) -> Result<ContentItem> {
        let started_at = Timestamp::now();
        let UploadRequest {
            data,
            filename,
            subdirectory,
            uploaded_at,
            uploaded_by,
        } = request;

        let (data, source_filename) = data.load().await?;
        let image = self.normalize(data).await?;
        self.codec().extension(image.mime_type)?;

        let uploaded_at = uploaded_at.unwrap_or_else(Timestamp::now);
        let subdirectory = subdirectory
            .as_deref()
            .and_then(trim_segment)
            .unwrap_or_else(|| date_directory(uploaded_at));

        let new_content = NewMediaContent {
            media_box_id: media_box.id,
            subdirectory: Some(subdirectory),
            filename: filename.or(source_filename).unwrap_or_default(),
            width: Some(saturate(image.width)),
            height: Some(saturate(image.height)),
            content_type: image.mime_type.to_owned(),
            uploaded_at,
            created_by: uploaded_by,
        };

        let record = self.store().create_media_content(new_content).await?;
        let content_id = record.id;

        let mut written = None;
        let result = self.commit(media_box, record, image.data, &mut written).await;

        match &result {
            Ok(item) => {
                tracing::info!(
                    target: TRACING_TARGET_UPLOAD,
                    content_id = %item.id,
                    path = %item.path(),
                    size = item.size,
                    resized = image.resized,
                    elapsed_ms = Timestamp::now().duration_since(started_at).as_millis(),
                    "Upload stored"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    content_id = %content_id,
                    error = %error,
                    "Upload failed, rolling back"
                );
                self.rollback(content_id, written.as_deref()).await;
            }
        }

        result
    }

    /// Decodes and resizes on the blocking pool.
    async fn normalize(&self, data: Bytes) -> Result<ProcessedImage> {
        let max_width = self.config().upload_image_max_width;
        let jpeg_quality = self.config().jpeg_quality;

        tokio::task::spawn_blocking(move || imaging::process(data, max_width, jpeg_quality))
            .await
            .map_err(|e| Error::invalid_content("image processing task failed").with_source(e))?
    }

    /// Assigns the identifier, writes the bytes and checks the quota.
    ///
    /// `written` is set once a file may exist at the returned path.
    async fn commit(
        &self,
        media_box: &MediaBox,
        record: MediaContent,
        data: Bytes,
        written: &mut Option<String>,
    ) -> Result<ContentItem> {
        let uri = self
            .codec()
            .identifier(record.id, record.uploaded_at, &record.content_type)?;
        let record = self.store().assign_media_content_uri(record.id, &uri).await?;

        let path = record.path_in(&self.root_path(media_box));
        *written = Some(path.clone());
        self.storage().put(&path, data).await?;
        let new_size = self.storage().size(&path).await?;

        let used_size = self.used_size(media_box).await?;
        let max_size = self.max_size(media_box);
        if used_size.saturating_add(new_size) > max_size {
            return Err(Error::QuotaExceeded {
                box_id: media_box.id,
                used_size,
                new_size,
                max_size,
            });
        }

        let record = self
            .store()
            .update_media_content_size(record.id, new_size)
            .await?;

        Ok(self.item(media_box, record))
    }

    /// Best-effort removal of a failed upload's file and record.
    async fn rollback(&self, content_id: Uuid, path: Option<&str>) {
        if let Some(path) = path
            && let Err(error) = self.storage().delete(path).await
        {
            tracing::warn!(
                target: TRACING_TARGET_UPLOAD,
                path = %path,
                error = %error,
                "Failed to remove file of a failed upload"
            );
        }

        if let Err(error) = self.store().delete_media_content(content_id).await {
            tracing::warn!(
                target: TRACING_TARGET_UPLOAD,
                content_id = %content_id,
                error = %error,
                "Failed to remove record of a failed upload"
            );
        }
    }
}

fn saturate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::ImageFormat;
    use mediabox_core::storage::MediaStorage;
    use mediabox_core::types::NewMediaBox;
    use mediabox_core::{ErrorKind, MediaBoxConfig, MimeMap};

    use super::*;
    use crate::imaging::tests::sample;
    use crate::service::tests::{FailingCall, default_harness, harness};

    const MIB: i64 = 1024 * 1024;

    #[tokio::test]
    async fn records_backend_size_and_metadata() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let data = sample(40, 30, ImageFormat::Png);
        let request = UploadRequest::new(UploadData::named(data.clone(), "image.png"))
            .with_uploaded_at_str("2024-05-01T10:00:00Z")?
            .with_uploaded_by("alice");
        let item = service.upload(&media_box, request).await?;

        assert_eq!(item.size, data.len() as i64);
        assert_eq!(item.size, harness.storage.size(item.path()).await?);
        assert_eq!((item.width, item.height), (Some(40), Some(30)));
        assert_eq!(item.content_type, "image/png");
        assert_eq!(item.filename, "image.png");
        assert_eq!(item.subdirectory.as_deref(), Some("20240501"));
        assert_eq!(item.created_by.as_deref(), Some("alice"));

        let uri = item.uri.as_deref().unwrap();
        assert!(uri.ends_with(".png"));
        assert!(!uri.contains("image"));
        assert_eq!(
            item.path(),
            format!("{}/20240501/{uri}", service.root_path(&media_box))
        );
        Ok(())
    }

    #[tokio::test]
    async fn file_uploads_keep_source_filename() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("image.png");
        std::fs::write(&file, sample(10, 10, ImageFormat::Png)).unwrap();

        let item = service
            .upload(&media_box, UploadRequest::new(UploadData::file(&file)))
            .await?;
        assert_eq!(item.filename, "image.png");
        assert_eq!(item.content_type, "image/png");
        assert!(item.uri.as_deref().unwrap().ends_with(".png"));

        let renamed = service
            .upload(
                &media_box,
                UploadRequest::new(UploadData::file(&file)).with_filename("cover.png"),
            )
            .await?;
        assert_eq!(renamed.filename, "cover.png");
        Ok(())
    }

    #[tokio::test]
    async fn data_urls_have_no_filename() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let data = sample(12, 12, ImageFormat::Gif);
        let value = format!("data:image/gif;base64,{}", STANDARD.encode(&data));
        let item = service
            .upload(&media_box, UploadRequest::new(UploadData::data_url(value)))
            .await?;

        assert_eq!(item.filename, "");
        assert_eq!(item.content_type, "image/gif");
        assert!(item.uri.as_deref().unwrap().ends_with(".gif"));
        Ok(())
    }

    #[tokio::test]
    async fn quota_overflow_leaves_no_residue() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service
            .create_box(NewMediaBox::new("owner").with_max_size(MIB))
            .await?;

        let existing = service
            .upload(&media_box, UploadRequest::new(UploadData::named(sample(8, 8, ImageFormat::Png), "small.png")))
            .await?;
        let used_before = service.used_size(&media_box).await?;

        let large = sample(1000, 700, ImageFormat::Bmp);
        assert!(large.len() > 2_000_000);
        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::named(large, "large.bmp")))
            .await
            .unwrap_err();

        let Error::QuotaExceeded {
            used_size,
            max_size,
            new_size,
            ..
        } = err
        else {
            panic!("expected quota error, got {err:?}");
        };
        assert_eq!((used_size, max_size), (used_before, MIB));
        assert!(new_size > MIB);

        assert_eq!(service.used_size(&media_box).await?, used_before);
        assert_eq!(service.content_count(&media_box).await?, 1);
        assert_eq!(service.contents(&media_box).await?, vec![existing.clone()]);
        assert_eq!(harness.storage.deleted().len(), 1);
        let orphan = &harness.storage.deleted()[0];
        assert!(!harness.storage.exists(orphan).await?);
        assert!(harness.storage.exists(existing.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn failed_size_lookup_rolls_back_row_and_file() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        harness.storage.fail(FailingCall::Size);
        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::named(sample(8, 8, ImageFormat::Png), "a.png")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);

        let written = harness.storage.written();
        assert_eq!(written.len(), 1);
        assert_eq!(harness.storage.deleted(), written);
        assert!(!harness.storage.exists(&written[0]).await?);
        assert_eq!(harness.store.content_count().await, 0);
        assert_eq!(service.used_size(&media_box).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_rolls_back_row() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;
        let existing = service
            .upload(&media_box, UploadRequest::new(UploadData::named(sample(8, 8, ImageFormat::Png), "a.png")))
            .await?;

        harness.storage.fail(FailingCall::Put);
        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::named(sample(8, 8, ImageFormat::Png), "b.png")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);

        assert_eq!(harness.storage.written(), [existing.path().to_owned()]);
        assert_eq!(service.contents(&media_box).await?, vec![existing.clone()]);
        assert!(harness.storage.exists(existing.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn quota_allows_exact_fill() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let data = sample(16, 16, ImageFormat::Png);
        let size = data.len() as i64;
        let media_box = service
            .create_box(NewMediaBox::new("owner").with_max_size(2 * size))
            .await?;

        for name in ["a.png", "b.png"] {
            service
                .upload(&media_box, UploadRequest::new(UploadData::named(data.clone(), name)))
                .await?;
        }
        assert_eq!(service.usage(&media_box, 0).await?, 100.0);

        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::named(data, "c.png")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        Ok(())
    }

    #[tokio::test]
    async fn default_max_size_applies() -> Result<()> {
        let config = MediaBoxConfig::builder()
            .with_uri_salt("salt")
            .with_default_max_size(10i64)
            .build()
            .unwrap();
        let harness = harness(config);
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::bytes(sample(64, 64, ImageFormat::Png))))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(harness.store.content_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn resizes_wide_images() -> Result<()> {
        let config = MediaBoxConfig::builder()
            .with_uri_salt("salt")
            .with_upload_image_max_width(50u32)
            .build()
            .unwrap();
        let harness = harness(config);
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let item = service
            .upload(&media_box, UploadRequest::new(UploadData::bytes(sample(200, 100, ImageFormat::Jpeg))))
            .await?;
        assert_eq!((item.width, item.height), (Some(50), Some(25)));
        assert_eq!(item.content_type, "image/jpeg");
        assert!(item.uri.as_deref().unwrap().ends_with(".jpeg"));
        assert_eq!(item.size, harness.storage.size(item.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn unmapped_and_invalid_content_fail_before_writing() -> Result<()> {
        let config = MediaBoxConfig::builder()
            .with_uri_salt("salt")
            .with_mime_map(MimeMap::empty().with("image/jpeg", "jpg"))
            .build()
            .unwrap();
        let harness = harness(config);
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;

        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::bytes(sample(4, 4, ImageFormat::Png))))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMimeType { ref mime_type } if mime_type == "image/png"));

        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::bytes(&b"not an image"[..])))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidContent);

        let err = service
            .upload(&media_box, UploadRequest::new(UploadData::data_url("data:image/png;base64,@@")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidContent);

        assert_eq!(harness.store.content_count().await, 0);
        assert!(harness.storage.deleted().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_without_writing() -> Result<()> {
        let harness = default_harness();
        let service = &harness.service;
        let media_box = service.create_box(NewMediaBox::new("owner")).await?;
        let data = sample(4, 4, ImageFormat::Png);

        let request = UploadRequest::new(UploadData::named(data, "a.png")).with_subdirectory("/gallery/2024/");
        let first = service.upload(&media_box, request.clone()).await?;
        assert_eq!(first.subdirectory.as_deref(), Some("gallery/2024"));
        assert!(first.path().contains("/gallery/2024/"));

        let err = service.upload(&media_box, request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateContent);
        assert_eq!(service.content_count(&media_box).await?, 1);
        Ok(())
    }

    #[test]
    fn saturate_clamps() {
        assert_eq!(saturate(7), 7);
        assert_eq!(saturate(u32::MAX), i32::MAX);
    }
}

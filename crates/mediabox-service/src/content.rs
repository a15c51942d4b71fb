//! Content items: stored records together with their resolved locations.

use derive_more::Deref;
use mediabox_core::types::MediaContent;
use serde::Serialize;

/// A content record with its storage path and external URL.
///
/// Dereferences to the underlying [`MediaContent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deref)]
pub struct ContentItem {
    #[deref]
    #[serde(flatten)]
    record: MediaContent,
    path: String,
    url: String,
}

impl ContentItem {
    pub(crate) fn new(record: MediaContent, path: String, url: String) -> Self {
        Self { record, path, url }
    }

    /// Backend-neutral storage path, `/<prefix>/<directory>/<subdirectory>/<identifier>`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// External URL resolved by the storage backend.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the underlying record.
    #[inline]
    pub fn record(&self) -> &MediaContent {
        &self.record
    }

    pub fn into_record(self) -> MediaContent {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn serializes_record_with_locations() -> serde_json::Result<()> {
        let now = Timestamp::now();
        let record = MediaContent {
            id: Uuid::nil(),
            media_box_id: Uuid::nil(),
            subdirectory: Some("20240501".into()),
            filename: "cat.png".into(),
            size: 12,
            width: Some(2),
            height: Some(3),
            content_type: "image/png".into(),
            uri: Some("token.png".into()),
            uploaded_at: now,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        let item = ContentItem::new(
            record,
            "/mbox/d/20240501/token.png".into(),
            "https://cdn.example.com/mbox/d/20240501/token.png".into(),
        );

        assert_eq!(item.filename, "cat.png");
        let value = serde_json::to_value(&item)?;
        assert_eq!(value["filename"], "cat.png");
        assert_eq!(value["size"], 12);
        assert_eq!(value["path"], "/mbox/d/20240501/token.png");
        assert_eq!(value["url"], "https://cdn.example.com/mbox/d/20240501/token.png");
        assert_eq!(item.into_record().uri.as_deref(), Some("token.png"));
        Ok(())
    }
}

//! In-memory store for testing.
//!
//! [`InMemoryStore`] implements [`MediaStore`] with the same uniqueness and
//! cascade rules as the Postgres store, so service logic can be exercised
//! without a database.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! mediabox-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::filter::Predicate;
use crate::store::{MediaStore, SharedStore};
use crate::types::{MediaBox, MediaContent, NewMediaBox, NewMediaContent};
use crate::{Error, Result, TRACING_TARGET_MOCK};

#[derive(Debug, Default)]
struct State {
    boxes: BTreeMap<Uuid, MediaBox>,
    contents: BTreeMap<Uuid, MediaContent>,
}

/// Store keeping every record in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store as a shared handle.
    pub fn shared(&self) -> SharedStore {
        Arc::new(self.clone())
    }

    /// Returns the total number of content records across all boxes.
    pub async fn content_count(&self) -> usize {
        self.state.lock().await.contents.len()
    }

    /// Returns the total number of boxes.
    pub async fn box_count(&self) -> usize {
        self.state.lock().await.boxes.len()
    }
}

fn content_not_found(content_id: Uuid) -> Error {
    Error::store(format!("media content '{content_id}' not found"))
}

#[async_trait::async_trait]
impl MediaStore for InMemoryStore {
    async fn create_media_box(&self, new_box: NewMediaBox) -> Result<MediaBox> {
        let mut state = self.state.lock().await;

        if state.boxes.values().any(|b| b.owner_id == new_box.owner_id) {
            return Err(Error::BoxAlreadyExists {
                owner_id: new_box.owner_id,
            });
        }
        if state.boxes.values().any(|b| b.directory == new_box.directory) {
            return Err(Error::store(format!(
                "media box directory '{}' is already taken",
                new_box.directory
            )));
        }

        let now = Timestamp::now();
        let media_box = MediaBox {
            id: Uuid::now_v7(),
            owner_id: new_box.owner_id,
            directory: new_box.directory,
            max_size: new_box.max_size,
            updated_by: new_box.created_by.clone(),
            created_by: new_box.created_by,
            created_at: now,
            updated_at: now,
        };
        state.boxes.insert(media_box.id, media_box.clone());

        tracing::trace!(
            target: TRACING_TARGET_MOCK,
            box_id = %media_box.id,
            "media box inserted"
        );

        Ok(media_box)
    }

    async fn find_media_box_by_id(&self, box_id: Uuid) -> Result<Option<MediaBox>> {
        Ok(self.state.lock().await.boxes.get(&box_id).cloned())
    }

    async fn find_media_box_by_owner(&self, owner_id: &str) -> Result<Option<MediaBox>> {
        let state = self.state.lock().await;
        Ok(state.boxes.values().find(|b| b.owner_id == owner_id).cloned())
    }

    async fn delete_media_box(&self, box_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().await;
        let deleted = state.boxes.remove(&box_id).is_some();
        state.contents.retain(|_, c| c.media_box_id != box_id);
        Ok(deleted)
    }

    async fn create_media_content(&self, new_content: NewMediaContent) -> Result<MediaContent> {
        let mut state = self.state.lock().await;

        if !state.boxes.contains_key(&new_content.media_box_id) {
            return Err(Error::store(format!(
                "media box '{}' not found",
                new_content.media_box_id
            )));
        }

        let duplicate = !new_content.filename.is_empty()
            && state.contents.values().any(|c| {
                c.media_box_id == new_content.media_box_id
                    && c.subdirectory == new_content.subdirectory
                    && c.filename == new_content.filename
            });
        if duplicate {
            return Err(Error::DuplicateContent {
                subdirectory: new_content.subdirectory,
                filename: new_content.filename,
            });
        }

        let now = Timestamp::now();
        let content = MediaContent {
            id: Uuid::now_v7(),
            media_box_id: new_content.media_box_id,
            subdirectory: new_content.subdirectory,
            filename: new_content.filename,
            size: 0,
            width: new_content.width,
            height: new_content.height,
            content_type: new_content.content_type,
            uri: None,
            uploaded_at: new_content.uploaded_at,
            updated_by: new_content.created_by.clone(),
            created_by: new_content.created_by,
            created_at: now,
            updated_at: now,
        };
        state.contents.insert(content.id, content.clone());
        Ok(content)
    }

    async fn assign_media_content_uri(&self, content_id: Uuid, uri: &str) -> Result<MediaContent> {
        let mut state = self.state.lock().await;

        if state
            .contents
            .values()
            .any(|c| c.id != content_id && c.uri.as_deref() == Some(uri))
        {
            return Err(Error::store(format!("identifier '{uri}' is already taken")));
        }

        let content = state
            .contents
            .get_mut(&content_id)
            .ok_or_else(|| content_not_found(content_id))?;
        content.uri = Some(uri.to_owned());
        content.updated_at = Timestamp::now();
        Ok(content.clone())
    }

    async fn update_media_content_size(&self, content_id: Uuid, size: i64) -> Result<MediaContent> {
        let mut state = self.state.lock().await;
        let content = state
            .contents
            .get_mut(&content_id)
            .ok_or_else(|| content_not_found(content_id))?;
        content.size = size;
        content.updated_at = Timestamp::now();
        Ok(content.clone())
    }

    async fn delete_media_content(&self, content_id: Uuid) -> Result<bool> {
        Ok(self.state.lock().await.contents.remove(&content_id).is_some())
    }

    async fn find_media_content_by_uri(
        &self,
        box_id: Uuid,
        uri: &str,
    ) -> Result<Option<MediaContent>> {
        let state = self.state.lock().await;
        Ok(state
            .contents
            .values()
            .find(|c| c.media_box_id == box_id && c.uri.as_deref() == Some(uri))
            .cloned())
    }

    async fn list_media_contents(
        &self,
        box_id: Uuid,
        predicates: &[Predicate],
    ) -> Result<Vec<MediaContent>> {
        let state = self.state.lock().await;
        let mut contents: Vec<MediaContent> = state
            .contents
            .values()
            .filter(|c| c.media_box_id == box_id)
            .filter(|c| predicates.iter().all(|p| p.matches(c)))
            .cloned()
            .collect();

        contents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(contents)
    }

    async fn sum_media_content_sizes(&self, box_id: Uuid) -> Result<i64> {
        let state = self.state.lock().await;
        Ok(state
            .contents
            .values()
            .filter(|c| c.media_box_id == box_id)
            .map(|c| c.size)
            .sum())
    }

    async fn count_media_contents(&self, box_id: Uuid) -> Result<i64> {
        let state = self.state.lock().await;
        let count = state
            .contents
            .values()
            .filter(|c| c.media_box_id == box_id)
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::predicates;

    fn new_content(box_id: Uuid, filename: &str) -> NewMediaContent {
        NewMediaContent {
            media_box_id: box_id,
            subdirectory: Some("20240501".into()),
            filename: filename.into(),
            width: Some(10),
            height: Some(10),
            content_type: "image/png".into(),
            uploaded_at: Timestamp::now(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn owner_is_unique() -> Result<()> {
        let store = InMemoryStore::new();
        store.create_media_box(NewMediaBox::new("u1")).await?;

        let err = store
            .create_media_box(NewMediaBox::new("u1").with_directory("other"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BoxAlreadyExists { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn logical_names_are_unique_unless_empty() -> Result<()> {
        let store = InMemoryStore::new();
        let media_box = store.create_media_box(NewMediaBox::new("u1")).await?;

        store.create_media_content(new_content(media_box.id, "a.png")).await?;
        let err = store
            .create_media_content(new_content(media_box.id, "a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateContent { .. }));

        store.create_media_content(new_content(media_box.id, "")).await?;
        store.create_media_content(new_content(media_box.id, "")).await?;
        assert_eq!(store.count_media_contents(media_box.id).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_box_cascades() -> Result<()> {
        let store = InMemoryStore::new();
        let media_box = store.create_media_box(NewMediaBox::new("u1")).await?;
        let content = store.create_media_content(new_content(media_box.id, "a.png")).await?;
        store.update_media_content_size(content.id, 42).await?;
        assert_eq!(store.sum_media_content_sizes(media_box.id).await?, 42);

        assert!(store.delete_media_box(media_box.id).await?);
        assert_eq!(store.content_count().await, 0);
        assert!(!store.delete_media_box(media_box.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn listing_filters_and_orders() -> Result<()> {
        let store = InMemoryStore::new();
        let media_box = store.create_media_box(NewMediaBox::new("u1")).await?;

        let mut older = new_content(media_box.id, "old.png");
        older.uploaded_at = Timestamp::from_second(1_000).unwrap();
        let older = store.create_media_content(older).await?;
        store.update_media_content_size(older.id, 10).await?;

        let newer = store.create_media_content(new_content(media_box.id, "new.png")).await?;
        store.update_media_content_size(newer.id, 20).await?;

        let all = store.list_media_contents(media_box.id, &[]).await?;
        assert_eq!(all[0].filename, "new.png");
        assert_eq!(all[1].filename, "old.png");

        let big = store
            .list_media_contents(media_box.id, &predicates("size>=15")?)
            .await?;
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].id, newer.id);
        Ok(())
    }

    #[tokio::test]
    async fn identifiers_are_unique() -> Result<()> {
        let store = InMemoryStore::new();
        let media_box = store.create_media_box(NewMediaBox::new("u1")).await?;
        let a = store.create_media_content(new_content(media_box.id, "a.png")).await?;
        let b = store.create_media_content(new_content(media_box.id, "b.png")).await?;

        store.assign_media_content_uri(a.id, "x.png").await?;
        assert!(store.assign_media_content_uri(b.id, "x.png").await.is_err());

        let found = store.find_media_content_by_uri(media_box.id, "x.png").await?;
        assert_eq!(found.map(|c| c.id), Some(a.id));
        Ok(())
    }
}

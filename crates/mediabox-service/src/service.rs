//! The media box service handle.

use std::fmt;
use std::sync::Arc;

use mediabox_core::storage::SharedStorage;
use mediabox_core::store::SharedStore;
use mediabox_core::types::{MediaBox, MediaContent};
use mediabox_core::{AddressCodec, MediaBoxConfig, Result};

use crate::content::ContentItem;
use crate::translate::PathTranslator;

/// Entry point for every media box operation.
///
/// Cheap to clone; all clones share the same configuration, store and
/// storage backend. Box operations live in [`boxes`](crate::boxes), the
/// upload pipeline in [`upload`](crate::upload).
#[derive(Clone)]
pub struct MediaBoxService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: MediaBoxConfig,
    store: SharedStore,
    storage: SharedStorage,
    codec: AddressCodec,
    translator: PathTranslator,
}

impl MediaBoxService {
    /// Creates a service over a store and a storage backend.
    ///
    /// Fails when the configuration cannot key the address codec.
    pub fn new(config: MediaBoxConfig, store: SharedStore, storage: SharedStorage) -> Result<Self> {
        let codec = AddressCodec::new(&config.uri_salt, config.mime_map.clone())?;
        let translator = PathTranslator::new(config.normalized_prefix(), storage.clone());

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                store,
                storage,
                codec,
                translator,
            }),
        })
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &MediaBoxConfig {
        &self.inner.config
    }

    /// Returns the path and URL translator.
    #[inline]
    pub fn translator(&self) -> &PathTranslator {
        &self.inner.translator
    }

    #[inline]
    pub(crate) fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    #[inline]
    pub(crate) fn storage(&self) -> &SharedStorage {
        &self.inner.storage
    }

    #[inline]
    pub(crate) fn codec(&self) -> &AddressCodec {
        &self.inner.codec
    }

    /// Returns the absolute root path of a box.
    pub fn root_path(&self, media_box: &MediaBox) -> String {
        media_box.root_path(self.config().normalized_prefix())
    }

    /// Returns the capacity of a box in bytes.
    pub fn max_size(&self, media_box: &MediaBox) -> i64 {
        media_box.effective_max_size(self.config().default_max_size)
    }

    /// Resolves path and URL of a record of `media_box`.
    pub(crate) fn item(&self, media_box: &MediaBox, record: MediaContent) -> ContentItem {
        let path = record.path_in(&self.root_path(media_box));
        let url = self.storage().url(&path);
        ContentItem::new(record, path, url)
    }
}

impl fmt::Debug for MediaBoxService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBoxService")
            .field("prefix", &self.inner.config.prefix)
            .field("relation_mode", &self.inner.config.relation_mode)
            .finish_non_exhaustive()
    }
}

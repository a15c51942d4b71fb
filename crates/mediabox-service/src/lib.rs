#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for box lifecycle and lookups.
pub const TRACING_TARGET_BOX: &str = "mediabox_service::boxes";

/// Tracing target for the upload pipeline.
pub const TRACING_TARGET_UPLOAD: &str = "mediabox_service::upload";

/// Tracing target for owner relation handling.
pub const TRACING_TARGET_OWNERSHIP: &str = "mediabox_service::ownership";

mod boxes;
mod content;
mod imaging;
mod ownership;
mod service;
mod translate;
mod upload;

#[doc(hidden)]
pub mod prelude;

pub use content::ContentItem;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mediabox_core::mock::InMemoryStore;
pub use imaging::{ProcessedImage, process as process_image};
pub use ownership::{OwnerDeletion, OwnershipManager};
pub use service::MediaBoxService;
pub use translate::{MediaRef, PathTranslator};
pub use upload::{UploadData, UploadRequest};

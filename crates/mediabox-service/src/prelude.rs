//! Commonly used items from mediabox-service.
//!
//! ```rust,ignore
//! use mediabox_service::prelude::*;
//! ```

pub use mediabox_core::prelude::*;

pub use crate::{
    ContentItem, MediaBoxService, MediaRef, OwnerDeletion, OwnershipManager, PathTranslator,
    UploadData, UploadRequest,
};

//! Domain records for boxes and their content.
//!
//! - [`MediaBox`]: one owner's storage container and its capacity.
//! - [`MediaContent`]: one stored file's metadata and derived path.
//!
//! Both are plain values. Persistence lives behind [`MediaStore`] and bytes
//! behind [`MediaStorage`].
//!
//! [`MediaStore`]: crate::store::MediaStore
//! [`MediaStorage`]: crate::storage::MediaStorage

mod media_box;
mod media_content;

pub use media_box::{MediaBox, NewMediaBox, default_directory};
pub use media_content::{MediaContent, NewMediaContent};

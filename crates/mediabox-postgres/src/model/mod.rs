//! Database models for boxes and their content.
//!
//! Each model converts into the matching `mediabox_core::types` record, which
//! is what leaves this crate.

mod media_box;
mod media_content;

pub use media_box::{MediaBox, NewMediaBox, UpdateMediaBox};
pub use media_content::{MediaContent, NewMediaContent, UpdateMediaContent};

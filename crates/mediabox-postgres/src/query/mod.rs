//! Database query repositories for boxes and content records.
//!
//! Repositories are implemented for [`PgConnection`] so that callers decide
//! which connection a call runs on.
//!
//! [`PgConnection`]: crate::PgConnection

mod media_box;
mod media_content;

pub use media_box::MediaBoxRepository;
pub use media_content::MediaContentRepository;

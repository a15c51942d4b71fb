#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for content addressing.
pub const TRACING_TARGET_CODEC: &str = "mediabox_core::codec";

/// Tracing target for condition filter parsing.
pub const TRACING_TARGET_FILTER: &str = "mediabox_core::filter";

/// Tracing target for the in-memory store.
pub const TRACING_TARGET_MOCK: &str = "mediabox_core::mock";

mod codec;
mod config;
mod error;
mod format;
mod mime;

pub mod filter;
pub mod image_text;
pub mod path;
pub mod storage;
pub mod store;
pub mod timestamp;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[doc(hidden)]
pub mod prelude;

pub use codec::{AddressCodec, TOKEN_ALPHABET, TOKEN_LENGTH};
pub use config::{MediaBoxConfig, MediaBoxConfigBuilder, MediaBoxConfigBuilderError, RelationMode};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use format::{format_size, usage_percent};
pub use mime::MimeMap;

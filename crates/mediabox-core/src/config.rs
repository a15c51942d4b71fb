//! Media box configuration.

use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{Error, MimeMap, Result};

/// Relationship between an owner entity and its media box.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, IntoStaticStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationMode {
    /// Owner deletion leaves the box and its content untouched.
    #[default]
    Aggregation,
    /// Owner deletion cascades to the box and all of its content.
    Composition,
}

impl RelationMode {
    /// Parses a raw configuration value, failing on unrecognized modes.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim()).map_err(|_| {
            Error::config(format!(
                "unknown relation mode '{value}', expected 'aggregation' or 'composition'"
            ))
        })
    }

    /// Returns whether owner deletion must cascade to the box.
    #[inline]
    pub fn cascades(self) -> bool {
        matches!(self, Self::Composition)
    }
}

/// Immutable configuration shared by every media box operation.
///
/// Built once at startup and handed to the service; nothing reads
/// configuration from ambient state afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "MediaBoxConfigBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct MediaBoxConfig {
    /// Root path prefix under which every box directory lives.
    #[builder(default = "defaults::PREFIX.to_owned()")]
    #[serde(default = "defaults::prefix")]
    pub prefix: String,

    /// Capacity in bytes for boxes without an explicit maximum.
    #[builder(default = "defaults::DEFAULT_MAX_SIZE")]
    #[serde(default = "defaults::default_max_size")]
    pub default_max_size: i64,

    /// Images wider than this are downscaled on upload.
    #[builder(default)]
    #[serde(default)]
    pub upload_image_max_width: Option<u32>,

    /// Owner-relation mode applied on owner deletion.
    #[builder(default)]
    #[serde(default)]
    pub relation_mode: RelationMode,

    /// Secret salt keying the address codec.
    pub uri_salt: String,

    /// Content type to extension mapping.
    #[builder(default)]
    #[serde(default)]
    pub mime_map: MimeMap,

    /// Quality used when re-encoding resized JPEG images.
    #[builder(default = "defaults::JPEG_QUALITY")]
    #[serde(default = "defaults::jpeg_quality")]
    pub jpeg_quality: u8,
}

mod defaults {
    pub const PREFIX: &str = "mbox";
    pub const DEFAULT_MAX_SIZE: i64 = 100 * 1024 * 1024;
    pub const JPEG_QUALITY: u8 = 90;

    pub fn prefix() -> String {
        PREFIX.to_owned()
    }

    pub fn default_max_size() -> i64 {
        DEFAULT_MAX_SIZE
    }

    pub fn jpeg_quality() -> u8 {
        JPEG_QUALITY
    }
}

impl MediaBoxConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(prefix) = &self.prefix
            && prefix.trim_matches(['/', '\\', ' ']).is_empty()
        {
            return Err("prefix must not be empty".into());
        }

        match &self.uri_salt {
            Some(salt) if salt.is_empty() => return Err("uri_salt must not be empty".into()),
            _ => {}
        }

        if let Some(size) = self.default_max_size
            && size <= 0
        {
            return Err("default_max_size must be positive".into());
        }

        if let Some(Some(0)) = self.upload_image_max_width {
            return Err("upload_image_max_width must be positive".into());
        }

        if let Some(quality) = self.jpeg_quality
            && !(1..=100).contains(&quality)
        {
            return Err("jpeg_quality must be between 1 and 100".into());
        }

        Ok(())
    }
}

impl MediaBoxConfig {
    /// Returns a builder for the configuration.
    pub fn builder() -> MediaBoxConfigBuilder {
        MediaBoxConfigBuilder::default()
    }

    /// Creates a configuration with default values and the given salt.
    pub fn new(uri_salt: impl Into<String>) -> Result<Self> {
        Self::builder()
            .with_uri_salt(uri_salt)
            .build()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Returns the prefix without surrounding separators.
    pub fn normalized_prefix(&self) -> &str {
        self.prefix.trim_matches(['/', '\\', ' '])
    }
}

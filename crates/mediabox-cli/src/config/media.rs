//! Media box options.

use clap::Args;
use mediabox_core::{MediaBoxConfig, MimeMap, RelationMode};

/// Options of the media box service.
#[derive(Clone, Args)]
pub struct MediaBoxArgs {
    /// Secret salt keying content identifiers
    #[arg(long = "mediabox-uri-salt", env = "MEDIABOX_URI_SALT")]
    pub uri_salt: String,

    /// Root prefix of every box directory
    #[arg(long = "mediabox-prefix", env = "MEDIABOX_PREFIX", default_value = "mbox")]
    pub prefix: String,

    /// Capacity in bytes of boxes without their own maximum
    #[arg(
        long = "mediabox-default-max-size",
        env = "MEDIABOX_DEFAULT_MAX_SIZE",
        default_value_t = 100 * 1024 * 1024
    )]
    pub default_max_size: i64,

    /// Images wider than this are scaled down on upload
    #[arg(long = "mediabox-image-max-width", env = "MEDIABOX_IMAGE_MAX_WIDTH")]
    pub image_max_width: Option<u32>,

    /// What happens to a box when its owner is deleted
    #[arg(
        long = "mediabox-relation-mode",
        env = "MEDIABOX_RELATION_MODE",
        default_value = "aggregation",
        value_parser = parse_relation_mode
    )]
    pub relation_mode: RelationMode,

    /// Quality of re-encoded JPEG images (1-100)
    #[arg(
        long = "mediabox-jpeg-quality",
        env = "MEDIABOX_JPEG_QUALITY",
        default_value_t = 90
    )]
    pub jpeg_quality: u8,

    /// Extra `type=extension` pairs added to the built-in content types
    #[arg(
        long = "mediabox-mime",
        env = "MEDIABOX_MIME",
        value_delimiter = ',',
        value_parser = parse_mime_entry
    )]
    pub mime: Vec<(String, String)>,
}

fn parse_relation_mode(value: &str) -> Result<RelationMode, String> {
    RelationMode::parse(value).map_err(|e| e.to_string())
}

fn parse_mime_entry(value: &str) -> Result<(String, String), String> {
    let (mime_type, extension) = value
        .split_once('=')
        .ok_or_else(|| format!("expected type=extension, got `{value}`"))?;
    let (mime_type, extension) = (mime_type.trim(), extension.trim().trim_start_matches('.'));
    if mime_type.is_empty() || extension.is_empty() {
        return Err(format!("expected type=extension, got `{value}`"));
    }

    Ok((mime_type.to_owned(), extension.to_owned()))
}

impl MediaBoxArgs {
    /// Returns the built-in content types extended by `--mediabox-mime`.
    pub fn mime_map(&self) -> MimeMap {
        let mut map = MimeMap::default();
        for (mime_type, extension) in &self.mime {
            map.insert(mime_type, extension);
        }
        map
    }

    /// Builds the validated service configuration.
    pub fn to_config(&self) -> mediabox_core::Result<MediaBoxConfig> {
        let mut builder = MediaBoxConfig::builder()
            .with_uri_salt(self.uri_salt.clone())
            .with_prefix(self.prefix.clone())
            .with_default_max_size(self.default_max_size)
            .with_relation_mode(self.relation_mode)
            .with_jpeg_quality(self.jpeg_quality)
            .with_mime_map(self.mime_map());

        if let Some(width) = self.image_max_width {
            builder = builder.with_upload_image_max_width(width);
        }

        builder
            .build()
            .map_err(|e| mediabox_core::Error::config(e.to_string()))
    }
}

impl std::fmt::Debug for MediaBoxArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBoxArgs")
            .field("prefix", &self.prefix)
            .field("default_max_size", &self.default_max_size)
            .field("image_max_width", &self.image_max_width)
            .field("relation_mode", &self.relation_mode)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("mime", &self.mime)
            .finish_non_exhaustive()
    }
}

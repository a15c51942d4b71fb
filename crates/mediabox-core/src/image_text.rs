//! Inline `data:image/...;base64,` values.
//!
//! Such values are content themselves rather than references to stored
//! content, so path and URL translation pass them through untouched.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::{Error, Result};

/// Number of leading characters inspected for the data URL header.
const HEADER_WINDOW: usize = 50;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[A-Za-z0-9.+\-]+);base64,").expect("data url header pattern is valid")
});

/// Returns whether the value is an inline base64 image.
pub fn is_image_text(value: &str) -> bool {
    if value.len() < HEADER_WINDOW {
        return false;
    }

    let window = match value.char_indices().nth(HEADER_WINDOW) {
        Some((end, _)) => &value[..end],
        None => value,
    };
    HEADER.is_match(window)
}

/// A decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageText {
    /// Declared MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Decoded bytes.
    pub data: Vec<u8>,
}

impl ImageText {
    /// Decodes a `data:image/<type>;base64,<payload>` string.
    pub fn decode(value: &str) -> Result<Self> {
        let value = value.trim();
        let captures = HEADER
            .captures(value)
            .ok_or_else(|| Error::invalid_content("value is not a base64 image data URL"))?;

        let mime_type = captures[1].to_ascii_lowercase();
        let payload: String = value[captures[0].len()..]
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let data = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| Error::invalid_content("malformed base64 payload").with_source(e))?;

        Ok(Self { mime_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_PREFIX: &str = "data:image/png;base64,";

    fn long_payload() -> String {
        format!("{PNG_PREFIX}{}", STANDARD.encode([7u8; 64]))
    }

    #[test]
    fn detects_long_data_urls() {
        assert!(is_image_text(&long_payload()));
    }

    #[test]
    fn short_values_are_not_image_text() {
        assert!(!is_image_text("data:image/png;base64,AAAA"));
        assert!(!is_image_text("/mbox/abc/x.png"));
    }

    #[test]
    fn non_image_data_urls_are_rejected() {
        let value = format!("data:text/plain;base64,{}", STANDARD.encode([1u8; 64]));
        assert!(!is_image_text(&value));
    }

    #[test]
    fn decode_returns_type_and_bytes() {
        let decoded = ImageText::decode(&long_payload()).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.data, vec![7u8; 64]);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = ImageText::decode("data:image/png;base64,@@@").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidContent);
        assert!(ImageText::decode("hello").is_err());
    }
}

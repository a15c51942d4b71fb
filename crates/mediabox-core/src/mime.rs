//! Content type to file extension mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("image/bmp", "bmp"),
    ("image/x-bmp", "bmp"),
    ("image/x-bitmap", "bmp"),
    ("image/x-xbitmap", "bmp"),
    ("image/x-win-bitmap", "bmp"),
    ("image/x-windows-bmp", "bmp"),
    ("image/ms-bmp", "bmp"),
    ("image/x-ms-bmp", "bmp"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpeg"),
    ("image/pjpeg", "jpeg"),
    ("image/png", "png"),
    ("image/x-png", "png"),
    ("image/svg+xml", "svg"),
    ("image/tiff", "tiff"),
    ("image/webp", "webp"),
];

/// Maps MIME types onto the extensions used for stored files.
///
/// Keys are normalized on insertion and lookup: lowercase, without
/// parameters such as `; charset=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct MimeMap {
    entries: BTreeMap<String, String>,
}

impl Default for MimeMap {
    fn default() -> Self {
        DEFAULT_ENTRIES.iter().copied().collect()
    }
}

impl MimeMap {
    /// Creates an empty map.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adds or replaces a mapping.
    pub fn insert(&mut self, mime_type: &str, extension: &str) {
        self.entries.insert(
            normalize(mime_type),
            extension.trim_start_matches('.').to_ascii_lowercase(),
        );
    }

    /// Returns the mapping with an extra entry.
    pub fn with(mut self, mime_type: &str, extension: &str) -> Self {
        self.insert(mime_type, extension);
        self
    }

    /// Resolves the extension for a content type.
    pub fn extension(&self, mime_type: &str) -> Result<&str> {
        self.entries
            .get(&normalize(mime_type))
            .map(String::as_str)
            .ok_or_else(|| Error::UnsupportedMimeType {
                mime_type: mime_type.to_owned(),
            })
    }

    /// Returns whether the content type is mapped.
    pub fn contains(&self, mime_type: &str) -> bool {
        self.entries.contains_key(&normalize(mime_type))
    }

    /// Returns the number of mapped content types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no content type is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for MimeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::empty();
        for (mime_type, extension) in iter {
            map.insert(mime_type.as_ref(), extension.as_ref());
        }
        map
    }
}

impl From<BTreeMap<String, String>> for MimeMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<MimeMap> for BTreeMap<String, String> {
    fn from(map: MimeMap) -> Self {
        map.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_common_images() -> Result<()> {
        let map = MimeMap::default();
        assert_eq!(map.extension("image/x-ms-bmp")?, "bmp");
        assert_eq!(map.extension("image/pjpeg")?, "jpeg");
        assert_eq!(map.extension("image/svg+xml")?, "svg");
        assert_eq!(map.extension("image/webp")?, "webp");
        assert_eq!(map.len(), DEFAULT_ENTRIES.len());
        Ok(())
    }

    #[test]
    fn lookup_ignores_case_and_parameters() -> Result<()> {
        let map = MimeMap::default();
        assert_eq!(map.extension("IMAGE/PNG")?, "png");
        assert_eq!(map.extension("image/png; q=1")?, "png");
        Ok(())
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = MimeMap::default().extension("text/plain").unwrap_err();
        assert!(matches!(err, Error::UnsupportedMimeType { ref mime_type } if mime_type == "text/plain"));
    }

    #[test]
    fn custom_entries_are_normalized() -> Result<()> {
        let map = MimeMap::empty().with("Image/AVIF", ".AVIF");
        assert_eq!(map.extension("image/avif")?, "avif");
        assert!(!map.contains("image/png"));
        Ok(())
    }
}

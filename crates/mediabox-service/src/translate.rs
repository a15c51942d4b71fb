//! Translation between stored paths and external URLs.
//!
//! Values that do not refer to managed content pass through unchanged in
//! both directions, so translating twice is harmless.

use std::borrow::Cow;
use std::sync::LazyLock;

use mediabox_core::image_text::is_image_text;
use mediabox_core::path::combine;
use mediabox_core::storage::SharedStorage;
use regex::{Captures, Regex};
use url::Url;

use crate::content::ContentItem;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
        .expect("img src pattern is valid")
});

/// A value to translate: a content item or an arbitrary string.
#[derive(Debug, Clone, Copy)]
pub enum MediaRef<'a> {
    Content(&'a ContentItem),
    Text(&'a str),
}

impl<'a> From<&'a ContentItem> for MediaRef<'a> {
    fn from(item: &'a ContentItem) -> Self {
        Self::Content(item)
    }
}

impl<'a> From<&'a str> for MediaRef<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for MediaRef<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

/// Converts between managed paths and backend URLs.
#[derive(Clone)]
pub struct PathTranslator {
    prefix: String,
    storage: SharedStorage,
}

impl PathTranslator {
    /// Creates a translator for paths below `prefix`.
    pub fn new(prefix: &str, storage: SharedStorage) -> Self {
        Self {
            prefix: combine([prefix]),
            storage,
        }
    }

    /// Returns the rooted prefix, e.g. `/mbox`.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns whether `value` is a path below the prefix.
    pub fn is_managed_path(&self, value: &str) -> bool {
        let rooted = if value.starts_with('/') {
            Cow::Borrowed(value)
        } else {
            Cow::Owned(format!("/{value}"))
        };

        starts_with_segment(&rooted, &self.prefix)
    }

    /// Returns the storage path of a content item or of a URL pointing at
    /// managed content; anything else is returned unchanged.
    pub fn path_from_url_or_value<'a>(&self, value: impl Into<MediaRef<'a>>) -> Cow<'a, str> {
        let text = match value.into() {
            MediaRef::Content(item) => return Cow::Borrowed(item.path()),
            MediaRef::Text(text) => text,
        };

        if is_image_text(text) {
            return Cow::Borrowed(text);
        }

        let base = self.storage.url(&self.prefix);
        if starts_with_segment(text, &base) {
            return Cow::Owned(format!("{}{}", self.prefix, &text[base.len()..]));
        }

        let Ok(url) = Url::parse(text) else {
            return Cow::Borrowed(text);
        };

        if url.host().is_none() {
            return Cow::Borrowed(text);
        }

        let marker = format!("{}/", self.prefix);
        match url.path().find(&marker) {
            Some(index) => Cow::Owned(url.path()[index..].to_owned()),
            None => Cow::Borrowed(text),
        }
    }

    /// Returns the URL of a content item or of a managed path; anything
    /// else is returned unchanged.
    pub fn url_from_path_or_value<'a>(&self, value: impl Into<MediaRef<'a>>) -> Cow<'a, str> {
        let text = match value.into() {
            MediaRef::Content(item) => return Cow::Borrowed(item.url()),
            MediaRef::Text(text) => text,
        };

        if is_image_text(text) || !self.is_managed_path(text) {
            return Cow::Borrowed(text);
        }

        Cow::Owned(self.storage.url(&combine([text])))
    }

    /// Rewrites every `<img src>` in `html` from stored path to URL.
    pub fn urls_in_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        rewrite_img_sources(html, |src| self.url_from_path_or_value(src).into_owned())
    }

    /// Rewrites every `<img src>` in `html` from URL to stored path.
    pub fn paths_in_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        rewrite_img_sources(html, |src| self.path_from_url_or_value(src).into_owned())
    }
}

impl std::fmt::Debug for PathTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTranslator")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Whether `value` equals `base` or continues it with a `/`.
fn starts_with_segment(value: &str, base: &str) -> bool {
    value
        .strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn rewrite_img_sources<'a>(html: &'a str, translate: impl Fn(&str) -> String) -> Cow<'a, str> {
    IMG_SRC.replace_all(html, |caps: &Captures<'_>| {
        let (quote, src) = match (caps.get(2), caps.get(3)) {
            (Some(src), _) => ('"', src.as_str()),
            (None, Some(src)) => ('\'', src.as_str()),
            (None, None) => ('"', ""),
        };
        format!("{}{quote}{}{quote}", &caps[1], translate(src))
    })
}

//! Media contents table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Media content table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum MediaContentConstraints {
    #[strum(serialize = "media_contents_size_min")]
    SizeMin,
    #[strum(serialize = "media_contents_dimensions_min")]
    DimensionsMin,
    #[strum(serialize = "media_contents_content_type_not_empty")]
    ContentTypeNotEmpty,

    #[strum(serialize = "media_contents_updated_after_created")]
    UpdatedAfterCreated,

    #[strum(serialize = "media_contents_uri_unique_idx")]
    UriUnique,
    #[strum(serialize = "media_contents_filename_unique_idx")]
    FilenameUnique,
}

impl MediaContentConstraints {
    /// Creates a new [`MediaContentConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            MediaContentConstraints::SizeMin
            | MediaContentConstraints::DimensionsMin
            | MediaContentConstraints::ContentTypeNotEmpty => ConstraintCategory::Validation,

            MediaContentConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,

            MediaContentConstraints::UriUnique | MediaContentConstraints::FilenameUnique => {
                ConstraintCategory::Uniqueness
            }
        }
    }
}

impl From<MediaContentConstraints> for String {
    #[inline]
    fn from(val: MediaContentConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for MediaContentConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

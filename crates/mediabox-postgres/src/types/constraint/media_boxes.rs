//! Media boxes table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Media box table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum MediaBoxConstraints {
    #[strum(serialize = "media_boxes_owner_id_not_empty")]
    OwnerIdNotEmpty,
    #[strum(serialize = "media_boxes_directory_not_empty")]
    DirectoryNotEmpty,
    #[strum(serialize = "media_boxes_max_size_min")]
    MaxSizeMin,

    #[strum(serialize = "media_boxes_updated_after_created")]
    UpdatedAfterCreated,

    #[strum(serialize = "media_boxes_owner_id_unique_idx")]
    OwnerIdUnique,
    #[strum(serialize = "media_boxes_directory_unique_idx")]
    DirectoryUnique,
}

impl MediaBoxConstraints {
    /// Creates a new [`MediaBoxConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            MediaBoxConstraints::OwnerIdNotEmpty
            | MediaBoxConstraints::DirectoryNotEmpty
            | MediaBoxConstraints::MaxSizeMin => ConstraintCategory::Validation,

            MediaBoxConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,

            MediaBoxConstraints::OwnerIdUnique | MediaBoxConstraints::DirectoryUnique => {
                ConstraintCategory::Uniqueness
            }
        }
    }
}

impl From<MediaBoxConstraints> for String {
    #[inline]
    fn from(val: MediaBoxConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for MediaBoxConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_variant_round_trips_its_name() {
        for constraint in MediaBoxConstraints::iter() {
            assert_eq!(MediaBoxConstraints::new(&constraint.to_string()), Some(constraint));
        }
    }
}

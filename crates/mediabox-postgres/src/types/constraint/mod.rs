//! Database constraint violations organized by table.

mod media_boxes;
mod media_contents;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::media_boxes::MediaBoxConstraints;
pub use self::media_contents::MediaContentConstraints;

/// Unified constraint violation enum that can represent any database constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    MediaBox(MediaBoxConstraints),
    MediaContent(MediaContentConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Chronological integrity constraints (timestamp relationships).
    Chronological,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// Returns `None` if the constraint name is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediabox_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("media_boxes_owner_id_unique_idx");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        if constraint.starts_with("media_boxes_") {
            MediaBoxConstraints::new(constraint).map(Self::MediaBox)
        } else if constraint.starts_with("media_contents_") {
            MediaContentConstraints::new(constraint).map(Self::MediaContent)
        } else {
            None
        }
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::MediaBox(_) => "media_boxes",
            ConstraintViolation::MediaContent(_) => "media_contents",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::MediaBox(c) => c.categorize(),
            ConstraintViolation::MediaContent(c) => c.categorize(),
        }
    }

    /// Returns the underlying constraint name as used in the database.
    #[inline]
    pub fn constraint_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::MediaBox(c) => write!(f, "{}", c),
            ConstraintViolation::MediaContent(c) => write!(f, "{}", c),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_constraints() {
        assert_eq!(
            ConstraintViolation::new("media_boxes_owner_id_unique_idx"),
            Some(ConstraintViolation::MediaBox(
                MediaBoxConstraints::OwnerIdUnique
            ))
        );

        assert_eq!(
            ConstraintViolation::new("media_contents_filename_unique_idx"),
            Some(ConstraintViolation::MediaContent(
                MediaContentConstraints::FilenameUnique
            ))
        );

        assert_eq!(ConstraintViolation::new("media_unknown"), None);
        assert_eq!(ConstraintViolation::new("unknown_constraint"), None);
    }

    #[test]
    fn reports_table_and_category() {
        let violation = ConstraintViolation::MediaContent(MediaContentConstraints::SizeMin);
        assert_eq!(violation.table_name(), "media_contents");
        assert_eq!(
            violation.constraint_category(),
            ConstraintCategory::Validation
        );

        let violation = ConstraintViolation::MediaBox(MediaBoxConstraints::UpdatedAfterCreated);
        assert_eq!(violation.table_name(), "media_boxes");
        assert_eq!(
            violation.constraint_category(),
            ConstraintCategory::Chronological
        );
    }

    #[test]
    fn serde_uses_constraint_name() -> serde_json::Result<()> {
        let violation = ConstraintViolation::MediaBox(MediaBoxConstraints::DirectoryUnique);
        let json = serde_json::to_string(&violation)?;
        assert_eq!(json, "\"media_boxes_directory_unique_idx\"");

        let parsed: ConstraintViolation = serde_json::from_str(&json)?;
        assert_eq!(parsed, violation);
        Ok(())
    }
}

//! Condition filter micro-language.
//!
//! A filter is a list of `field<op>value` clauses combined with AND, given
//! either as one `&`-joined string or as separate clause strings:
//!
//! ```
//! use mediabox_core::filter::{Condition, Operator, parse};
//!
//! let conditions = parse("content_type=image/png&size>=1024");
//! assert_eq!(conditions[1], Condition::new("size", Operator::Ge, "1024"));
//! ```
//!
//! Parsing is permissive: clauses without an operator are dropped and field
//! names are passed through. Converting a [`Condition`] into a [`Predicate`]
//! is where field names are checked against [`FilterField`] and values are
//! typed, so nothing reaches a store as raw text.

use std::cmp::Ordering;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::timestamp::parse_timestamp;
use crate::types::MediaContent;
use crate::{Error, Result, TRACING_TARGET_FILTER};

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    Eq,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
}

impl Operator {
    /// Operators in the order clauses are searched for them.
    ///
    /// Two-character operators come first so `a>=1` is never split on `=`.
    pub const SEARCH_ORDER: [Self; 5] = [Self::Ge, Self::Le, Self::Eq, Self::Gt, Self::Lt];

    /// Returns the textual form of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Returns whether an ordering between a stored value and the filter
    /// value satisfies the operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ge => ordering.is_ge(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Lt => ordering.is_lt(),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed `(field, operator, value)` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parses a single clause, returning `None` when it has no operator or
    /// no field name.
    pub fn parse(clause: &str) -> Option<Self> {
        let (index, operator) = Operator::SEARCH_ORDER
            .iter()
            .find_map(|op| clause.find(op.as_str()).map(|index| (index, *op)))?;

        let field = clause[..index].trim();
        if field.is_empty() {
            return None;
        }

        let value = clause[index + operator.as_str().len()..]
            .trim()
            .trim_matches(['"', '\''])
            .trim();

        Some(Self::new(field, operator, value))
    }

    /// Validates the field name and types the value.
    pub fn to_predicate(&self) -> Result<Predicate> {
        let field = FilterField::from_str(self.field.trim()).map_err(|_| {
            Error::invalid_filter(format!("unknown filter field '{}'", self.field))
        })?;

        let value = match field.value_kind() {
            ValueKind::Text => FilterValue::Text(self.value.clone()),
            ValueKind::Integer => self.value.parse().map(FilterValue::Integer).map_err(|_| {
                Error::invalid_filter(format!("'{}' expects an integer, got '{}'", field, self.value))
            })?,
            ValueKind::Timestamp => parse_timestamp(&self.value)
                .map(FilterValue::Timestamp)
                .map_err(|_| {
                    Error::invalid_filter(format!("'{}' expects a timestamp, got '{}'", field, self.value))
                })?,
        };

        Ok(Predicate {
            field,
            operator: self.operator,
            value,
        })
    }
}

/// Filter input: one `&`-joined expression or separate clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    Expression(String),
    Clauses(Vec<String>),
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::Clauses(Vec::new())
    }
}

impl From<&str> for FilterInput {
    fn from(value: &str) -> Self {
        Self::Expression(value.to_owned())
    }
}

impl From<String> for FilterInput {
    fn from(value: String) -> Self {
        Self::Expression(value)
    }
}

impl From<Vec<String>> for FilterInput {
    fn from(value: Vec<String>) -> Self {
        Self::Clauses(value)
    }
}

impl From<&[&str]> for FilterInput {
    fn from(value: &[&str]) -> Self {
        Self::Clauses(value.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterInput {
    fn from(value: [&str; N]) -> Self {
        Self::Clauses(value.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// Parses filter input into conditions, dropping malformed clauses.
pub fn parse(input: impl Into<FilterInput>) -> Vec<Condition> {
    let clauses: Vec<String> = match input.into() {
        FilterInput::Expression(expression) => {
            expression.split('&').map(str::to_owned).collect()
        }
        FilterInput::Clauses(clauses) => clauses,
    };

    clauses
        .iter()
        .filter(|clause| !clause.trim().is_empty())
        .filter_map(|clause| {
            let condition = Condition::parse(clause);
            if condition.is_none() {
                tracing::debug!(
                    target: TRACING_TARGET_FILTER,
                    clause = %clause,
                    "dropping malformed filter clause"
                );
            }
            condition
        })
        .collect()
}

/// Parses filter input and validates every condition.
pub fn predicates(input: impl Into<FilterInput>) -> Result<Vec<Predicate>> {
    parse(input).iter().map(Condition::to_predicate).collect()
}

/// Content fields a filter may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, IntoStaticStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterField {
    Filename,
    Subdirectory,
    ContentType,
    Size,
    Width,
    Height,
    UploadedAt,
}

enum ValueKind {
    Text,
    Integer,
    Timestamp,
}

impl FilterField {
    fn value_kind(self) -> ValueKind {
        match self {
            Self::Filename | Self::Subdirectory | Self::ContentType => ValueKind::Text,
            Self::Size | Self::Width | Self::Height => ValueKind::Integer,
            Self::UploadedAt => ValueKind::Timestamp,
        }
    }
}

/// Typed filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Timestamp(Timestamp),
}

/// A validated condition ready to be applied by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: FilterField,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Predicate {
    /// Evaluates the predicate against a content record.
    ///
    /// Absent values never match, as in SQL.
    pub fn matches(&self, content: &MediaContent) -> bool {
        let ordering = match (self.field, &self.value) {
            (FilterField::Filename, FilterValue::Text(v)) => Some(content.filename.as_str().cmp(v)),
            (FilterField::Subdirectory, FilterValue::Text(v)) => {
                content.subdirectory.as_deref().map(|s| s.cmp(v.as_str()))
            }
            (FilterField::ContentType, FilterValue::Text(v)) => {
                Some(content.content_type.as_str().cmp(v))
            }
            (FilterField::Size, FilterValue::Integer(v)) => Some(content.size.cmp(v)),
            (FilterField::Width, FilterValue::Integer(v)) => {
                content.width.map(|w| i64::from(w).cmp(v))
            }
            (FilterField::Height, FilterValue::Integer(v)) => {
                content.height.map(|h| i64::from(h).cmp(v))
            }
            (FilterField::UploadedAt, FilterValue::Timestamp(v)) => {
                Some(content.uploaded_at.cmp(v))
            }
            _ => None,
        };

        ordering.is_some_and(|ordering| self.operator.accepts(ordering))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn splits_expression_on_ampersand() {
        let conditions = parse("a=1&b>=2");
        assert_eq!(
            conditions,
            vec![
                Condition::new("a", Operator::Eq, "1"),
                Condition::new("b", Operator::Ge, "2"),
            ]
        );
    }

    #[test]
    fn two_character_operators_win() {
        assert_eq!(
            Condition::parse("a>=1"),
            Some(Condition::new("a", Operator::Ge, "1"))
        );
        assert_eq!(
            Condition::parse("a<=1"),
            Some(Condition::new("a", Operator::Le, "1"))
        );
    }

    #[test]
    fn strict_operators_are_recognized() {
        assert_eq!(
            Condition::parse("width > 10"),
            Some(Condition::new("width", Operator::Gt, "10"))
        );
        assert_eq!(
            Condition::parse("width<10"),
            Some(Condition::new("width", Operator::Lt, "10"))
        );
    }

    #[test]
    fn trims_whitespace_and_quotes() {
        assert_eq!(
            Condition::parse(" filename = 'cat.png' "),
            Some(Condition::new("filename", Operator::Eq, "cat.png"))
        );
        assert_eq!(
            Condition::parse("filename=\" dog.png\""),
            Some(Condition::new("filename", Operator::Eq, "dog.png"))
        );
    }

    #[test]
    fn malformed_clauses_are_dropped() {
        let conditions = parse("garbage&&=1&size>5");
        assert_eq!(conditions, vec![Condition::new("size", Operator::Gt, "5")]);
    }

    #[test]
    fn accepts_clause_arrays() {
        let conditions = parse(["size>=1", "nonsense", "width=2"]);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].field, "width");
    }

    #[test]
    fn unknown_fields_are_rejected_at_validation() {
        let err = predicates("id=1; drop table media").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidFilter);
    }

    #[test]
    fn values_are_typed_per_field() {
        let predicates = predicates("size>=10&uploaded_at<2024-05-01&filename=a.png").unwrap();
        assert_eq!(predicates[0].value, FilterValue::Integer(10));
        assert!(matches!(predicates[1].value, FilterValue::Timestamp(_)));
        assert_eq!(predicates[2].value, FilterValue::Text("a.png".into()));

        assert!(super::predicates("size>=big").is_err());
        assert!(super::predicates("uploaded_at=someday").is_err());
    }

    #[test]
    fn predicates_match_content() {
        let now = Timestamp::now();
        let content = MediaContent {
            id: Uuid::nil(),
            media_box_id: Uuid::nil(),
            subdirectory: None,
            filename: "cat.png".into(),
            size: 2048,
            width: Some(640),
            height: None,
            content_type: "image/png".into(),
            uri: None,
            uploaded_at: now,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let check = |expr: &str| {
            predicates(expr)
                .unwrap()
                .iter()
                .all(|predicate| predicate.matches(&content))
        };

        assert!(check("size>=2048&width<1000"));
        assert!(check("content_type=image/png"));
        assert!(!check("size>2048"));
        assert!(!check("height>0"));
        assert!(!check("subdirectory=x"));
    }
}

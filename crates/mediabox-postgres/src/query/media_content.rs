//! Media content repository.

use std::future::Future;

use bigdecimal::{BigDecimal, ToPrimitive};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mediabox_core::filter::{FilterField, FilterValue, Operator, Predicate};
use uuid::Uuid;

use crate::model::{MediaContent, NewMediaContent, UpdateMediaContent};
use crate::{PgConnection, PgError, PgResult, schema};

type BoxedContentQuery<'a> =
    schema::media_contents::BoxedQuery<'a, diesel::pg::Pg>;

/// Repository for media content database operations.
pub trait MediaContentRepository {
    /// Creates a new content record with size zero and no identifier.
    fn create_media_content(
        &mut self,
        new_content: NewMediaContent,
    ) -> impl Future<Output = PgResult<MediaContent>> + Send;

    /// Finds a content record of a box by its opaque identifier.
    fn find_media_content_by_uri(
        &mut self,
        box_id: Uuid,
        uri: &str,
    ) -> impl Future<Output = PgResult<Option<MediaContent>>> + Send;

    /// Updates a content record.
    fn update_media_content(
        &mut self,
        content_id: Uuid,
        updates: UpdateMediaContent,
    ) -> impl Future<Output = PgResult<MediaContent>> + Send;

    /// Deletes a content record, returning whether a row was deleted.
    fn delete_media_content(
        &mut self,
        content_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists the content of a box matching every predicate, newest first.
    fn list_media_contents(
        &mut self,
        box_id: Uuid,
        predicates: &[Predicate],
    ) -> impl Future<Output = PgResult<Vec<MediaContent>>> + Send;

    /// Sums the recorded sizes of a box's content.
    fn sum_media_content_sizes(
        &mut self,
        box_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Counts the content records of a box.
    fn count_media_contents(&mut self, box_id: Uuid)
    -> impl Future<Output = PgResult<i64>> + Send;
}

impl MediaContentRepository for PgConnection {
    async fn create_media_content(
        &mut self,
        new_content: NewMediaContent,
    ) -> PgResult<MediaContent> {
        use schema::media_contents;

        diesel::insert_into(media_contents::table)
            .values(&new_content)
            .returning(MediaContent::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_media_content_by_uri(
        &mut self,
        box_id: Uuid,
        uri: &str,
    ) -> PgResult<Option<MediaContent>> {
        use schema::media_contents::{self, dsl};

        media_contents::table
            .filter(dsl::media_box_id.eq(box_id))
            .filter(dsl::uri.eq(uri))
            .select(MediaContent::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_media_content(
        &mut self,
        content_id: Uuid,
        updates: UpdateMediaContent,
    ) -> PgResult<MediaContent> {
        use schema::media_contents::{self, dsl};

        diesel::update(media_contents::table.filter(dsl::id.eq(content_id)))
            .set(&updates)
            .returning(MediaContent::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_media_content(&mut self, content_id: Uuid) -> PgResult<bool> {
        use schema::media_contents::{self, dsl};

        let deleted = diesel::delete(media_contents::table.filter(dsl::id.eq(content_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn list_media_contents(
        &mut self,
        box_id: Uuid,
        predicates: &[Predicate],
    ) -> PgResult<Vec<MediaContent>> {
        use schema::media_contents::{self, dsl};

        let mut query = media_contents::table
            .filter(dsl::media_box_id.eq(box_id))
            .into_boxed();

        for predicate in predicates {
            query = apply_predicate(query, predicate)?;
        }

        query
            .order((dsl::uploaded_at.desc(), dsl::id.desc()))
            .select(MediaContent::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn sum_media_content_sizes(&mut self, box_id: Uuid) -> PgResult<i64> {
        use schema::media_contents::{self, dsl};

        let total: Option<BigDecimal> = media_contents::table
            .filter(dsl::media_box_id.eq(box_id))
            .select(diesel::dsl::sum(dsl::size))
            .first(self)
            .await
            .map_err(PgError::from)?;

        match total {
            None => Ok(0),
            Some(total) => total
                .to_i64()
                .ok_or_else(|| PgError::Unexpected("content size total overflows i64".into())),
        }
    }

    async fn count_media_contents(&mut self, box_id: Uuid) -> PgResult<i64> {
        use schema::media_contents::{self, dsl};

        media_contents::table
            .filter(dsl::media_box_id.eq(box_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}

macro_rules! compare {
    ($query:expr, $column:expr, $operator:expr, $value:expr) => {
        match $operator {
            Operator::Eq => $query.filter($column.eq($value)),
            Operator::Ge => $query.filter($column.ge($value)),
            Operator::Le => $query.filter($column.le($value)),
            Operator::Gt => $query.filter($column.gt($value)),
            Operator::Lt => $query.filter($column.lt($value)),
        }
    };
}

/// Narrows a boxed content query by one predicate.
///
/// Comparisons against `NULL` columns evaluate to unknown and drop the row.
fn apply_predicate<'a>(
    query: BoxedContentQuery<'a>,
    predicate: &Predicate,
) -> PgResult<BoxedContentQuery<'a>> {
    use schema::media_contents::dsl;

    let operator = predicate.operator;
    let query = match (predicate.field, predicate.value.clone()) {
        (FilterField::Filename, FilterValue::Text(v)) => compare!(query, dsl::filename, operator, v),
        (FilterField::Subdirectory, FilterValue::Text(v)) => {
            compare!(query, dsl::subdirectory, operator, v)
        }
        (FilterField::ContentType, FilterValue::Text(v)) => {
            compare!(query, dsl::content_type, operator, v)
        }
        (FilterField::Size, FilterValue::Integer(v)) => compare!(query, dsl::size, operator, v),
        (FilterField::Width, FilterValue::Integer(v)) => {
            compare!(query, dsl::width, operator, saturate(v))
        }
        (FilterField::Height, FilterValue::Integer(v)) => {
            compare!(query, dsl::height, operator, saturate(v))
        }
        (FilterField::UploadedAt, FilterValue::Timestamp(v)) => {
            let v = jiff_diesel::Timestamp::from(v);
            compare!(query, dsl::uploaded_at, operator, v)
        }
        (field, value) => {
            return Err(PgError::Unexpected(
                format!("filter value {value:?} does not fit field {field}").into(),
            ));
        }
    };

    Ok(query)
}

/// Pixel dimensions are stored as `int4`.
fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_values_saturate() {
        assert_eq!(saturate(640), 640);
        assert_eq!(saturate(i64::MAX), i32::MAX);
        assert_eq!(saturate(i64::MIN), i32::MIN);
    }

    #[test]
    fn predicates_compile_to_filters() {
        use diesel::debug_query;
        use schema::media_contents;

        let predicates = mediabox_core::filter::predicates(["size>=100", "content_type=image/png"])
            .expect("valid predicates");

        let mut query = media_contents::table.into_boxed();
        for predicate in &predicates {
            query = apply_predicate(query, predicate).expect("matching value kinds");
        }

        let sql = debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains("\"media_contents\".\"size\" >= $1"));
        assert!(sql.contains("\"media_contents\".\"content_type\" = $2"));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        use schema::media_contents;

        let predicate = Predicate {
            field: FilterField::Size,
            operator: Operator::Eq,
            value: FilterValue::Text("big".into()),
        };

        assert!(apply_predicate(media_contents::table.into_boxed(), &predicate).is_err());
    }
}

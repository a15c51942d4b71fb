//! Embedded schema migrations.

use std::future::Future;
use std::ops::DerefMut;
use std::time::{Duration, Instant};

use diesel::migration::{Migration, MigrationName, MigrationSource};
use diesel::pg::Pg;
use diesel::sql_query;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::PoolableConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied versions in ascending order.
    pub applied_versions: Vec<String>,
    /// Embedded versions not yet applied, in ascending order.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Returns true if every embedded migration has been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }

    /// Returns the most recently applied version.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall time of the run.
    pub duration: Duration,
    /// Versions applied by this run.
    pub applied_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns whether the schema was already current.
    pub fn is_no_op(&self) -> bool {
        self.applied_versions.is_empty()
    }
}

/// Returns the versions of every migration compiled into this crate.
pub fn embedded_migrations() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;

    let mut versions: Vec<String> = migrations
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();
    versions.sort();

    Ok(versions)
}

/// Reads applied versions from `__diesel_schema_migrations`.
///
/// A database that has never been migrated has no such table and reports
/// no applied versions.
pub async fn applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct TableExists {
        #[diesel(sql_type = diesel::sql_types::Bool)]
        exists: bool,
    }

    #[derive(diesel::QueryableByName)]
    struct AppliedVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let table = sql_query(
        "SELECT EXISTS (SELECT FROM information_schema.tables \
         WHERE table_name = '__diesel_schema_migrations') AS exists",
    )
    .get_result::<TableExists>(conn)
    .await?;

    if !table.exists {
        return Ok(Vec::new());
    }

    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<AppliedVersion>(conn)
        .await?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

/// Compares embedded migrations with the applied ones.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let applied_versions = applied_migrations(conn).await?;
    let pending_versions = embedded_migrations()?
        .into_iter()
        .filter(|version| !applied_versions.contains(version))
        .collect();

    let status = MigrationStatus {
        applied_versions,
        pending_versions,
    };

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_versions.len(),
        pending = status.pending_versions.len(),
        "Migration status retrieved"
    );

    Ok(status)
}

/// Applies every pending migration.
///
/// The diesel harness is synchronous, so it runs on the blocking pool over
/// an [`AsyncConnectionWrapper`].
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let start = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;

    let status = migration_status(&mut conn).await?;
    if status.is_up_to_date() {
        tracing::info!(target: TRACING_TARGET_MIGRATION, "Database schema is up to date");
        return Ok(MigrationResult {
            duration: start.elapsed(),
            applied_versions: Vec::new(),
        });
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = ?status.pending_versions,
        "Applying pending migrations"
    );

    let mut wrapper: AsyncConnectionWrapper<_> = conn.into();
    let (outcome, mut wrapper) = spawn_blocking(move || {
        let outcome = wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>());
        (outcome, wrapper)
    })
    .await
    .map_err(|err| PgError::Migration(err.into()))?;

    let duration = start.elapsed();
    if wrapper.deref_mut().is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_MIGRATION,
            "Connection is broken after running migrations"
        );
    }

    let applied_versions = outcome.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Database migration failed"
        );
        PgError::Migration(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        applied = applied_versions.len(),
        "Database migration completed"
    );

    Ok(MigrationResult {
        duration,
        applied_versions,
    })
}

/// Migration operations on a [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending migration.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Returns the applied and pending migration versions.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        migration_status(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_initial_migration() -> PgResult<()> {
        let versions = embedded_migrations()?;
        assert_eq!(versions, vec!["20240501000000".to_owned()]);
        Ok(())
    }

    #[test]
    fn status_reports_pending_versions() {
        let status = MigrationStatus {
            applied_versions: vec!["20240501000000".into()],
            pending_versions: vec![],
        };
        assert!(status.is_up_to_date());
        assert_eq!(status.last_applied_version(), Some("20240501000000"));

        let status = MigrationStatus {
            applied_versions: vec![],
            pending_versions: vec!["20240501000000".into()],
        };
        assert!(!status.is_up_to_date());
        assert_eq!(status.last_applied_version(), None);
    }

    #[test]
    fn empty_run_is_a_no_op() {
        let result = MigrationResult {
            duration: Duration::from_millis(3),
            applied_versions: vec![],
        };
        assert!(result.is_no_op());

        let result = MigrationResult {
            duration: Duration::from_millis(40),
            applied_versions: vec!["20240501000000".into()],
        };
        assert!(!result.is_no_op());
    }
}

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Migrations embedded into the final binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./src/migrations");

/// Tracing target for client lifecycle events.
pub const TRACING_TARGET_CLIENT: &str = "mediabox_postgres::client";

/// Tracing target for query execution.
pub const TRACING_TARGET_QUERY: &str = "mediabox_postgres::queries";

/// Tracing target for schema migrations.
pub const TRACING_TARGET_MIGRATION: &str = "mediabox_postgres::migrations";

/// Tracing target for connections and the pool.
pub const TRACING_TARGET_CONNECTION: &str = "mediabox_postgres::connection";

mod client;
mod error;
pub mod model;
pub mod query;
mod schema;
mod store;
pub mod types;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientMigrationExt, PgConfig,
    PgConn, PgPoolStatus, PooledConnection, applied_migrations, embedded_migrations,
    migration_status, run_pending_migrations,
};
pub use crate::error::{BoxError, PgError, PgResult};

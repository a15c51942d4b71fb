//! Subcommands and their execution.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use mediabox_core::types::NewMediaBox;
use mediabox_core::{ErrorKind, format_size};
use mediabox_opendal::StorageBackend;
use mediabox_postgres::{PgClient, PgClientMigrationExt};
use mediabox_service::{MediaBoxService, OwnershipManager, UploadData, UploadRequest};
use serde::Serialize;

use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Apply pending database migrations
    Migrate {
        /// Only report applied and pending versions
        #[arg(long)]
        status: bool,
    },
    /// Create the media box of an owner
    CreateBox {
        owner: String,
        /// Directory name below the prefix; derived from the owner if absent
        #[arg(long)]
        directory: Option<String>,
        /// Capacity in bytes; the configured default applies if absent
        #[arg(long)]
        max_size: Option<i64>,
        #[arg(long)]
        created_by: Option<String>,
    },
    /// Upload an image file or a data URL into an owner's box
    Upload {
        owner: String,
        /// Path of an image file, or a `data:image/...;base64,` string
        source: String,
        #[arg(long)]
        filename: Option<String>,
        /// Defaults to the upload day as YYYYMMDD
        #[arg(long)]
        subdirectory: Option<String>,
        /// RFC 3339 timestamp or date; defaults to now
        #[arg(long)]
        uploaded_at: Option<String>,
        #[arg(long)]
        uploaded_by: Option<String>,
    },
    /// List the content of a box, newest first
    List {
        owner: String,
        /// Conditions such as `size>=1024`, joined with `&` or repeated
        #[arg(long)]
        filter: Vec<String>,
    },
    /// Show the used size and capacity of a box
    Usage {
        owner: String,
        /// Decimals of the formatted values
        #[arg(long, default_value_t = 2)]
        precision: u32,
    },
    /// Resolve a stored path or URL to content of a box
    Find { owner: String, value: String },
    /// Translate a stored path to its public URL
    Url { value: String },
    /// Translate a public URL to its stored path
    Path { value: String },
    /// Delete a box with all of its content
    DeleteBox { owner: String },
    /// Apply the relation mode to a deleted owner
    DeleteOwner { owner: String },
}

#[derive(Debug, Serialize)]
struct UsageReport {
    owner_id: String,
    content_count: i64,
    used_size: i64,
    used_size_formatted: String,
    max_size: i64,
    max_size_formatted: String,
    usage_percent: f64,
}

/// Runs the selected subcommand and prints its result.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    if let Command::Migrate { status } = cli.command {
        let client = PgClient::new_with_test(cli.postgres.clone())
            .await
            .context("failed to connect to the database")?;
        return migrate(&client, status).await;
    }

    let config = cli.media.to_config().context("invalid media box configuration")?;
    let client = cli
        .postgres
        .clone()
        .build()
        .context("failed to create database client")?;

    let storage = StorageBackend::new(cli.storage.clone()).context("failed to create storage backend")?;
    let service = MediaBoxService::new(config, Arc::new(client), Arc::new(storage))
        .context("failed to create media box service")?;

    tracing::debug!(target: TRACING_TARGET_COMMAND, command = ?cli.command, "Executing command");

    match cli.command {
        Command::Migrate { .. } => Ok(()),
        Command::CreateBox {
            owner,
            directory,
            max_size,
            created_by,
        } => {
            let mut new_box = NewMediaBox::new(owner);
            if let Some(directory) = directory {
                new_box = new_box.with_directory(directory);
            }
            if let Some(max_size) = max_size {
                new_box = new_box.with_max_size(max_size);
            }
            if let Some(created_by) = created_by {
                new_box = new_box.with_created_by(created_by);
            }
            print(&service.create_box(new_box).await?)
        }
        Command::Upload {
            owner,
            source,
            filename,
            subdirectory,
            uploaded_at,
            uploaded_by,
        } => {
            let media_box = service.require_box(&owner).await?;
            let data = if source.trim_start().starts_with("data:") {
                UploadData::data_url(source)
            } else {
                UploadData::file(PathBuf::from(source))
            };

            let mut request = UploadRequest::new(data);
            request.filename = filename;
            request.subdirectory = subdirectory;
            request.uploaded_by = uploaded_by;
            if let Some(uploaded_at) = uploaded_at {
                request = request.with_uploaded_at_str(&uploaded_at)?;
            }

            print(&service.upload(&media_box, request).await?)
        }
        Command::List { owner, filter } => {
            let media_box = service.require_box(&owner).await?;
            print(&service.search(&media_box, filter.join("&")).await?)
        }
        Command::Usage { owner, precision } => {
            let media_box = service.require_box(&owner).await?;
            let used_size = service.used_size(&media_box).await?;
            let max_size = service.max_size(&media_box);
            let digits = precision as usize;

            print(&UsageReport {
                content_count: service.content_count(&media_box).await?,
                used_size,
                used_size_formatted: format_size(used_size, digits),
                max_size,
                max_size_formatted: format_size(max_size, digits),
                usage_percent: mediabox_core::usage_percent(used_size, max_size, precision),
                owner_id: owner,
            })
        }
        Command::Find { owner, value } => {
            let media_box = service.require_box(&owner).await?;
            print(&service.find(&media_box, &value).await?)
        }
        Command::Url { value } => print(&service.translator().url_from_path_or_value(&value)),
        Command::Path { value } => print(&service.translator().path_from_url_or_value(&value)),
        Command::DeleteBox { owner } => {
            let media_box = service.require_box(&owner).await?;
            service.delete_box(&media_box).await?;
            print(&media_box)
        }
        Command::DeleteOwner { owner } => {
            let outcome = OwnershipManager::new(service)
                .handle_owner_deleted(&owner)
                .await?;
            print(&outcome)
        }
    }
}

async fn migrate(client: &PgClient, status_only: bool) -> anyhow::Result<()> {
    if status_only {
        let status = client
            .migration_status()
            .await
            .context("failed to read migration status")?;
        return print(&serde_json::json!({
            "applied": status.applied_versions,
            "pending": status.pending_versions,
        }));
    }

    let result = client
        .run_pending_migrations()
        .await
        .context("failed to apply migrations")?;

    if result.is_no_op() {
        tracing::info!(target: TRACING_TARGET_COMMAND, "Schema already up to date");
    } else {
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            applied = result.applied_versions.len(),
            duration_ms = result.duration.as_millis(),
            "Migrations complete"
        );
    }

    print(&serde_json::json!({
        "applied": result.applied_versions,
        "up_to_date": result.is_no_op(),
    }))
}

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{output}");
    Ok(())
}

/// Returns the process exit code for an error.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<mediabox_core::Error>().map(|e| e.kind()) {
        Some(ErrorKind::BoxNotFound) => 3,
        Some(ErrorKind::BoxAlreadyExists | ErrorKind::DuplicateContent) => 4,
        Some(ErrorKind::QuotaExceeded) => 5,
        Some(
            ErrorKind::UnsupportedMimeType | ErrorKind::InvalidContent | ErrorKind::InvalidFilter,
        ) => 2,
        _ => 1,
    }
}

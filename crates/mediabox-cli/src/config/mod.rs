//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── postgres: PgConfig        # Database URL and pool
//! ├── storage: StorageConfig    # Backend, root, public URL
//! ├── media: MediaBoxArgs       # Salt, prefix, quota, resize, relation mode
//! └── command: Command
//! ```
//!
//! Every option can also be given through its environment variable.

mod media;

use std::process;

use clap::Parser;
pub use media::MediaBoxArgs;
use mediabox_opendal::StorageConfig;
use mediabox_postgres::PgConfig;

use crate::commands::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "mediabox")]
#[command(about = "Manage per-owner media boxes")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub postgres: PgConfig,

    #[clap(flatten)]
    pub storage: StorageConfig,

    #[clap(flatten)]
    pub media: MediaBoxArgs,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads `.env` (if enabled) and parses the arguments.
    ///
    /// The file is read first so clap sees its variables as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            postgres_url = %self.postgres.database_url_masked(),
            postgres_max_connections = self.postgres.postgres_max_connections,
            storage_backend = %self.storage.backend_type,
            storage_root = %self.storage.root,
            prefix = %self.media.prefix,
            relation_mode = %self.media.relation_mode,
            "Configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "fs").then_some("fs"),
            cfg!(feature = "s3").then_some("s3"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "mediabox",
            "--postgres-url",
            "postgresql://localhost/mediabox",
            "--mediabox-uri-salt",
            "salt",
            "--mediabox-relation-mode",
            "composition",
            "--mediabox-mime",
            "image/avif=avif,image/x-icon=ico",
            "list",
            "user-1",
            "--filter",
            "size>=10",
            "--filter",
            "width<=200",
        ])
        .unwrap();

        assert_eq!(cli.media.relation_mode, mediabox_core::RelationMode::Composition);
        assert_eq!(cli.media.mime.len(), 2);
        assert_eq!(cli.media.mime[1], ("image/x-icon".to_owned(), "ico".to_owned()));
        assert_eq!(cli.storage.backend_type, mediabox_opendal::BackendType::Memory);
        let Command::List { owner, filter } = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(owner, "user-1");
        assert_eq!(filter, ["size>=10", "width<=200"]);
    }
}

//! Command-line interface for the Thousands data migration.
//!
//! The `migrate` subcommand resolves its settings from CLI flags, a
//! `.thousands.toml` file and `THOUSANDS_CMDS_MIGRATE_*` environment
//! variables, then runs the ridges, summits, users and climbs families in
//! order.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::info;

mod config;
mod error;
mod migrate;

pub use error::CliError;
pub use migrate::{MigrationReport, UploadTally};

use config::MigrateArgs;
use migrate::{DefaultMigrationBackends, run_migrate};

const ARG_SOURCE_DSN: &str = "source-dsn";
const ARG_IMAGES_DIR: &str = "images-dir";
const ARG_EXPORT_DIR: &str = "export-dir";
const ARG_MIRROR_DB: &str = "mirror-db";
const ARG_S3_ENDPOINT: &str = "s3-endpoint";
const ARG_S3_BUCKET: &str = "s3-bucket";
const ARG_S3_REGION: &str = "s3-region";
const ARG_S3_ACCESS_KEY: &str = "s3-access-key";
const ARG_S3_SECRET_KEY: &str = "s3-secret-key";
const ARG_UPLOAD_CONCURRENCY: &str = "upload-concurrency";
const ARG_RESET_MIRROR: &str = "reset-mirror";
const ENV_SOURCE_DSN: &str = "THOUSANDS_CMDS_MIGRATE_SOURCE_DSN";
const ENV_IMAGES_DIR: &str = "THOUSANDS_CMDS_MIGRATE_IMAGES_DIR";
const ENV_EXPORT_DIR: &str = "THOUSANDS_CMDS_MIGRATE_EXPORT_DIR";
const ENV_MIRROR_DB: &str = "THOUSANDS_CMDS_MIGRATE_MIRROR_DB";
const ENV_S3_BUCKET: &str = "THOUSANDS_CMDS_MIGRATE_S3_BUCKET";
const ENV_S3_ACCESS_KEY: &str = "THOUSANDS_CMDS_MIGRATE_S3_ACCESS_KEY";
const ENV_S3_SECRET_KEY: &str = "THOUSANDS_CMDS_MIGRATE_S3_SECRET_KEY";
const ENV_UPLOAD_CONCURRENCY: &str = "THOUSANDS_CMDS_MIGRATE_UPLOAD_CONCURRENCY";

/// Run the Thousands CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, or when
/// any entity family fails to migrate. Failed uploads are reported in the
/// logged summary instead.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Migrate(args) => {
            let report = run_migrate(args, &DefaultMigrationBackends)?;
            info!("{report}");
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "thousands",
    about = "Migrate the Thousands database into documents, object storage and SQLite",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export documents, upload images and mirror users and climbs.
    Migrate(MigrateArgs),
}

#[cfg(test)]
mod tests;

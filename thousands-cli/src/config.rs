//! Layered configuration for the `migrate` subcommand.

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use thousands_data::upload::{DEFAULT_S3_REGION, DEFAULT_UPLOAD_CONCURRENCY, S3Config};

use crate::{
    ARG_EXPORT_DIR, ARG_IMAGES_DIR, ARG_MIRROR_DB, ARG_RESET_MIRROR, ARG_S3_ACCESS_KEY,
    ARG_S3_BUCKET, ARG_S3_ENDPOINT, ARG_S3_REGION, ARG_S3_SECRET_KEY, ARG_SOURCE_DSN,
    ARG_UPLOAD_CONCURRENCY, CliError, ENV_EXPORT_DIR, ENV_IMAGES_DIR, ENV_MIRROR_DB,
    ENV_S3_ACCESS_KEY, ENV_S3_BUCKET, ENV_S3_SECRET_KEY, ENV_SOURCE_DSN, ENV_UPLOAD_CONCURRENCY,
};

/// CLI arguments for the `migrate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Export ridges and summits as YAML documents, upload their \
                 images to S3-compatible storage and mirror users and climbs \
                 into SQLite. Settings can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Run the full migration"
)]
#[ortho_config(prefix = "THOUSANDS")]
pub(crate) struct MigrateArgs {
    /// Connection string of the Postgres source database.
    #[arg(long = ARG_SOURCE_DSN, value_name = "dsn")]
    #[serde(default)]
    pub(crate) source_dsn: Option<String>,
    /// Directory holding the source image files.
    #[arg(long = ARG_IMAGES_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) images_dir: Option<Utf8PathBuf>,
    /// Directory receiving the exported documents. Its contents are replaced.
    #[arg(long = ARG_EXPORT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) export_dir: Option<Utf8PathBuf>,
    /// Path of the SQLite mirror database.
    #[arg(long = ARG_MIRROR_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) mirror_db: Option<Utf8PathBuf>,
    /// Endpoint of the S3-compatible object store.
    #[arg(long = ARG_S3_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) s3_endpoint: Option<String>,
    /// Bucket receiving the images.
    #[arg(long = ARG_S3_BUCKET, value_name = "name")]
    #[serde(default)]
    pub(crate) s3_bucket: Option<String>,
    /// Signing region (defaults to `us-east-1`).
    #[arg(long = ARG_S3_REGION, value_name = "region")]
    #[serde(default)]
    pub(crate) s3_region: Option<String>,
    /// Access key id for the object store.
    #[arg(long = ARG_S3_ACCESS_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) s3_access_key: Option<String>,
    /// Secret access key for the object store.
    #[arg(long = ARG_S3_SECRET_KEY, value_name = "secret")]
    #[serde(default)]
    pub(crate) s3_secret_key: Option<String>,
    /// Maximum number of simultaneous transfers (defaults to 10).
    #[arg(long = ARG_UPLOAD_CONCURRENCY, value_name = "count")]
    #[serde(default)]
    pub(crate) upload_concurrency: Option<usize>,
    /// Delete mirrored image and climb rows before writing new ones.
    #[arg(
        long = ARG_RESET_MIRROR,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) reset_mirror: Option<bool>,
}

impl MigrateArgs {
    pub(crate) fn into_config(self) -> Result<MigrateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MigrateConfig::try_from(merged)
    }
}

/// Resolved `migrate` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct MigrateConfig {
    pub(crate) source_dsn: String,
    pub(crate) images_dir: Utf8PathBuf,
    pub(crate) export_dir: Utf8PathBuf,
    pub(crate) mirror_db: Utf8PathBuf,
    pub(crate) s3: S3Config,
    pub(crate) upload_concurrency: NonZeroUsize,
    pub(crate) reset_mirror: bool,
}

impl MigrateConfig {
    /// Check the local paths before anything is deleted or written.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match thousands_fs::dir_exists(&self.images_dir) {
            Ok(true) => {}
            Ok(false) => {
                return Err(CliError::MissingSourceDirectory {
                    field: ARG_IMAGES_DIR,
                    path: self.images_dir.clone(),
                });
            }
            Err(source) => {
                return Err(CliError::InspectSourcePath {
                    field: ARG_IMAGES_DIR,
                    path: self.images_dir.clone(),
                    source,
                });
            }
        }
        Self::require_directory_or_absent(&self.export_dir)
    }

    fn require_directory_or_absent(path: &Utf8Path) -> Result<(), CliError> {
        match thousands_fs::file_is_file(path) {
            Ok(false) => Ok(()),
            Ok(true) => Err(CliError::OutputDirectoryNotDirectory {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_EXPORT_DIR,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

impl TryFrom<MigrateArgs> for MigrateConfig {
    type Error = CliError;

    fn try_from(args: MigrateArgs) -> Result<Self, Self::Error> {
        let source_dsn = required(args.source_dsn, ARG_SOURCE_DSN, ENV_SOURCE_DSN)?;
        let images_dir = required(args.images_dir, ARG_IMAGES_DIR, ENV_IMAGES_DIR)?;
        let export_dir = required(args.export_dir, ARG_EXPORT_DIR, ENV_EXPORT_DIR)?;
        let mirror_db = required(args.mirror_db, ARG_MIRROR_DB, ENV_MIRROR_DB)?;
        let bucket = required(args.s3_bucket, ARG_S3_BUCKET, ENV_S3_BUCKET)?;
        let access_key = required(args.s3_access_key, ARG_S3_ACCESS_KEY, ENV_S3_ACCESS_KEY)?;
        let secret_key = required(args.s3_secret_key, ARG_S3_SECRET_KEY, ENV_S3_SECRET_KEY)?;

        let upload_concurrency = match args.upload_concurrency {
            None => DEFAULT_UPLOAD_CONCURRENCY,
            Some(width) => NonZeroUsize::new(width).ok_or(CliError::ZeroConcurrency {
                field: ARG_UPLOAD_CONCURRENCY,
                env: ENV_UPLOAD_CONCURRENCY,
            })?,
        };

        let mut s3 = S3Config::new(bucket, access_key, secret_key)
            .with_region(args.s3_region.unwrap_or_else(|| DEFAULT_S3_REGION.to_owned()));
        if let Some(endpoint) = args.s3_endpoint {
            s3 = s3.with_endpoint(endpoint);
        }

        Ok(Self {
            source_dsn,
            images_dir,
            export_dir,
            mirror_db,
            s3,
            upload_concurrency,
            reset_mirror: args.reset_mirror.unwrap_or(false),
        })
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MigrateConfig, CliError> {
    let merged = MigrateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MigrateConfig::try_from(merged)
}

//! Error types emitted by the Thousands CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use thousands_data::export::ExportError;
use thousands_data::mirror::MirrorError;
use thousands_data::source::SourceError;
use thousands_data::upload::UploaderBuildError;

/// Errors emitted by the Thousands CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The upload concurrency was configured as zero.
    #[error("{field} must be greater than zero (check --{field} or {env})")]
    ZeroConcurrency {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input directory does not exist.
    #[error("{field} path {path:?} does not exist or is not a directory")]
    MissingSourceDirectory {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The export directory exists but is a file.
    #[error("export directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory { path: Utf8PathBuf },
    /// Clearing and recreating the export directory failed.
    #[error("failed to reset export directory {path:?}")]
    ResetExportDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Connecting to the relational source failed.
    #[error("failed to open the relational source")]
    Connect(#[source] SourceError),
    /// Reading one entity family from the relational source failed.
    #[error("failed to read {family} from the relational source")]
    ReadFamily {
        family: &'static str,
        #[source]
        source: SourceError,
    },
    /// Writing export documents failed.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// Writing the mirror store failed.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    /// The bulk uploader could not be constructed.
    #[error(transparent)]
    BuildUploader(#[from] UploaderBuildError),
}

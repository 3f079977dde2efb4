use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while writing the export tree.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export destination {path} already exists")]
    DestinationConflict { path: Utf8PathBuf },
    #[error("ridge directory {path} for summit {summit_id} does not exist")]
    MissingRidgeDirectory {
        summit_id: String,
        path: Utf8PathBuf,
    },
    #[error("rows for summit {summit_id} are not contiguous; the source must order them by summit")]
    NonContiguousParent { summit_id: String },
    #[error("failed to serialise document {path}")]
    Serialise {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

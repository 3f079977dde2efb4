use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Boxed error produced by an object store client.
pub type BoxedStoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures reported by an [`ObjectStore`](super::ObjectStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote service or its transport returned an error.
    #[error("{operation} request for {key} failed")]
    Service {
        operation: &'static str,
        key: String,
        #[source]
        source: BoxedStoreError,
    },
    /// The store refused the request without an underlying client error.
    #[error("{operation} request for {key} was rejected: {message}")]
    Rejected {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl StoreError {
    /// Wrap a client error raised while performing `operation` on `key`.
    pub fn service(
        operation: &'static str,
        key: impl Into<String>,
        source: impl Into<BoxedStoreError>,
    ) -> Self {
        Self::Service {
            operation,
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Terminal failure of a single transfer task.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to probe object {key}")]
    Probe {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("local asset {path} for object {key} does not exist")]
    MissingLocalAsset { key: String, path: Utf8PathBuf },
    #[error("failed to read local asset {path} for object {key}")]
    ReadAsset {
        key: String,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to upload object {key}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("object {key} from {path} is already claimed by {kept}")]
    KeyConflict {
        key: String,
        path: Utf8PathBuf,
        kept: Utf8PathBuf,
    },
}

impl TransferError {
    /// Destination key of the failed task.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Probe { key, .. }
            | Self::MissingLocalAsset { key, .. }
            | Self::ReadAsset { key, .. }
            | Self::Upload { key, .. }
            | Self::KeyConflict { key, .. } => key,
        }
    }
}

/// Errors raised while constructing a [`BulkUploader`](super::BulkUploader).
#[derive(Debug, Error)]
pub enum UploaderBuildError {
    #[error("failed to build Tokio runtime for uploads")]
    Runtime(#[source] io::Error),
}

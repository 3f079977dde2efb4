use camino::Utf8PathBuf;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised by the mirror store.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("failed to create parent directory for mirror database {path}")]
    CreateParent {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open SQLite database at {path}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: SqliteError,
    },
    #[error("failed to execute migration step '{step}'")]
    Migration {
        step: &'static str,
        #[source]
        source: SqliteError,
    },
    #[error(
        "expected mirror schema version {expected} but found {found}; migrate the database before retrying"
    )]
    VersionMismatch { expected: i64, found: i64 },
    #[error("unknown user image size code {code:?}")]
    UnknownImageSize { code: String },
    #[error("failed to {operation}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: SqliteError,
    },
}

use std::io;

use thiserror::Error;
use thousands_core::PointDecodeError;

/// Errors raised while reading the relational snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to build Tokio runtime for the relational source")]
    Runtime(#[source] io::Error),
    #[error("failed to connect to the relational source")]
    Connect(#[source] sqlx::Error),
    #[error("failed to {operation}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("summit {summit_id} has malformed coordinates")]
    Coordinates {
        summit_id: String,
        #[source]
        source: PointDecodeError,
    },
}

use std::io;

use camino::Utf8Path;
use serde::Serialize;

use super::error::ExportError;

/// Serialise `document` as YAML into a file that must not exist yet.
pub(super) fn write_document<T: Serialize>(
    path: &Utf8Path,
    document: &T,
) -> Result<(), ExportError> {
    let yaml = serde_yaml::to_string(document).map_err(|source| ExportError::Serialise {
        path: path.to_path_buf(),
        source,
    })?;
    thousands_fs::write_new_file(path, yaml.as_bytes()).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            ExportError::DestinationConflict {
                path: path.to_path_buf(),
            }
        } else {
            ExportError::Io {
                operation: "write document",
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

use std::io;

use camino::Utf8Path;
use log::info;
use thousands_core::RidgeRow;

use super::document::write_document;
use super::error::ExportError;

/// File name of the metadata document inside each ridge directory.
pub const RIDGE_META_FILE: &str = "_meta.yaml";

/// Create one directory per ridge under `dest` and write its metadata.
///
/// Returns the number of ridges written.
///
/// # Errors
///
/// Returns [`ExportError::DestinationConflict`] when a ridge directory already
/// exists and [`ExportError::Io`] for any other filesystem failure.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use thousands_core::RidgeRow;
/// use thousands_data::export::export_ridges;
///
/// let temp = tempfile::tempdir()?;
/// let dest = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 path");
/// let ridges = [RidgeRow { id: "r1".into(), name: "Ridge One".into(), color: "red".into() }];
///
/// assert_eq!(export_ridges(&dest, &ridges)?, 1);
/// let meta = std::fs::read_to_string(dest.join("r1/_meta.yaml"))?;
/// assert_eq!(meta, "name: Ridge One\ncolor: red\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn export_ridges(dest: &Utf8Path, rows: &[RidgeRow]) -> Result<usize, ExportError> {
    for ridge in rows {
        let ridge_dir = dest.join(&ridge.id);
        thousands_fs::create_new_dir(&ridge_dir).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                ExportError::DestinationConflict {
                    path: ridge_dir.clone(),
                }
            } else {
                ExportError::Io {
                    operation: "create ridge directory",
                    path: ridge_dir.clone(),
                    source,
                }
            }
        })?;
        write_document(&ridge_dir.join(RIDGE_META_FILE), &ridge.meta())?;
    }
    info!("exported {} ridges", rows.len());
    Ok(rows.len())
}

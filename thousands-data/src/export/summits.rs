use std::collections::HashSet;

use camino::Utf8Path;
use log::{debug, info};
use thousands_core::{
    ImageRef, SummitDocument, SummitKey, SummitRow, TransferTask, summit_image_keys,
};

use super::document::write_document;
use super::error::ExportError;

/// Documents written for the summit family and the assets they reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummitExport {
    /// Number of summit documents written.
    pub documents: usize,
    /// Transfer tasks for every referenced image, full image before preview.
    pub tasks: Vec<TransferTask>,
}

/// A contiguous run of joined rows describing one summit.
#[derive(Debug, Clone, PartialEq)]
pub struct SummitRun<'a> {
    /// Parent columns shared by every row in the run.
    pub key: SummitKey,
    /// The joined rows, in source order.
    pub rows: &'a [SummitRow],
}

/// Partition ordered rows into runs sharing the same parent key.
///
/// The rows must arrive sorted by summit. A summit id that shows up again
/// after its run ended means the input was not ordered, so the whole input is
/// rejected before any run is returned.
///
/// # Errors
///
/// Returns [`ExportError::NonContiguousParent`] naming the repeated summit.
pub fn group_summit_rows(rows: &[SummitRow]) -> Result<Vec<SummitRun<'_>>, ExportError> {
    let mut seen = HashSet::new();
    let mut runs = Vec::new();
    for chunk in rows.chunk_by(|left, right| left.key() == right.key()) {
        let Some(first) = chunk.first() else {
            continue;
        };
        if !seen.insert(first.id.as_str()) {
            return Err(ExportError::NonContiguousParent {
                summit_id: first.id.clone(),
            });
        }
        runs.push(SummitRun {
            key: first.key(),
            rows: chunk,
        });
    }
    Ok(runs)
}

/// Write one document per summit and collect the image transfer tasks.
///
/// Images are numbered from zero in row order. Rows lacking either the image
/// or the preview file carry no image and do not consume a position. Local
/// files are resolved against `images_dir`; document references hold object
/// keys only.
///
/// # Errors
///
/// Fails on unordered input, on a missing ridge directory, when a document
/// already exists or when the filesystem rejects a write.
///
/// # Examples
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use thousands_core::{RidgeRow, SummitRow, decode_point};
/// use thousands_data::export::{export_ridges, export_summits};
///
/// let temp = tempfile::tempdir()?;
/// let dest = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 path");
/// let ridge = RidgeRow {
///     id: "r1".into(),
///     name: "Ridge One".into(),
///     color: "red".into(),
/// };
/// export_ridges(&dest, &[ridge])?;
///
/// let row = SummitRow {
///     id: "s1".into(),
///     ridge_id: "r1".into(),
///     name: "Peak".into(),
///     name_alt: None,
///     height: 4000,
///     description: None,
///     interpretation: None,
///     coordinates: decode_point(Some("(45.12345,7.6789)"))?,
///     image: Some("a.jpg".into()),
///     preview: Some("a_p.jpg".into()),
///     comment: Some("Вид".into()),
/// };
/// let export = export_summits(&dest, Utf8Path::new("/images"), &[row])?;
///
/// assert_eq!(export.documents, 1);
/// let keys: Vec<_> = export.tasks.iter().map(|task| task.key.as_str()).collect();
/// assert_eq!(keys, ["summits/s1_vid_0.jpg", "summits/s1_vid_0_preview.jpg"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn export_summits(
    dest: &Utf8Path,
    images_dir: &Utf8Path,
    rows: &[SummitRow],
) -> Result<SummitExport, ExportError> {
    let runs = group_summit_rows(rows)?;
    let mut export = SummitExport::default();
    for run in runs {
        let document = build_document(&run, images_dir, &mut export.tasks);
        let ridge_dir = dest.join(&run.key.ridge_id);
        let ridge_exists =
            thousands_fs::dir_exists(&ridge_dir).map_err(|source| ExportError::Io {
                operation: "inspect ridge directory",
                path: ridge_dir.clone(),
                source,
            })?;
        if !ridge_exists {
            return Err(ExportError::MissingRidgeDirectory {
                summit_id: run.key.id.clone(),
                path: ridge_dir,
            });
        }
        let path = ridge_dir.join(format!("{}.yaml", run.key.id));
        write_document(&path, &document)?;
        debug!("wrote {path} with {} images", document.images.len());
        export.documents += 1;
    }
    info!(
        "exported {} summits referencing {} assets",
        export.documents,
        export.tasks.len()
    );
    Ok(export)
}

fn build_document(
    run: &SummitRun<'_>,
    images_dir: &Utf8Path,
    tasks: &mut Vec<TransferTask>,
) -> SummitDocument {
    let mut document = run.key.document();
    let image_rows = run
        .rows
        .iter()
        .filter_map(|row| row.image_files().map(|files| (row, files)));
    for (index, (row, (image, preview))) in image_rows.enumerate() {
        let keys = summit_image_keys(&run.key.id, row.comment.as_deref(), index);
        tasks.push(TransferTask::new(images_dir.join(image), keys.url.clone()));
        tasks.push(TransferTask::new(
            images_dir.join(preview),
            keys.preview_url.clone(),
        ));
        document.images.push(ImageRef {
            url: keys.url,
            preview_url: keys.preview_url,
            comment: row.comment.clone(),
        });
    }
    document
}

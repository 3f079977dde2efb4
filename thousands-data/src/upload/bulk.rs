use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::io;
use std::num::NonZeroUsize;

use camino::Utf8Path;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use thousands_core::TransferTask;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::error::{TransferError, UploaderBuildError};
use super::report::{TaskOutcome, TaskResult, UploadReport};
use super::store::{ObjectStore, ProbeOutcome};

/// Default number of simultaneous transfers.
pub const DEFAULT_UPLOAD_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(width) => width,
    None => NonZeroUsize::MIN,
};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploads transfer tasks with a fixed concurrency ceiling.
///
/// The uploader owns a current-thread Tokio runtime so synchronous callers
/// can treat [`BulkUploader::upload_all`] as a blocking fan-out/fan-in
/// barrier. Async callers use [`BulkUploader::transfer_all`] directly.
pub struct BulkUploader<S> {
    store: S,
    width: NonZeroUsize,
    runtime: Runtime,
}

impl<S: fmt::Debug> fmt::Debug for BulkUploader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkUploader")
            .field("store", &self.store)
            .field("width", &self.width)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl<S: ObjectStore> BulkUploader<S> {
    /// Create an uploader that runs at most `width` transfers at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio runtime fails to build.
    pub fn new(store: S, width: NonZeroUsize) -> Result<Self, UploaderBuildError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(UploaderBuildError::Runtime)?;
        Ok(Self {
            store,
            width,
            runtime,
        })
    }

    /// Borrow the underlying object store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve every task, blocking until all have reached a terminal state.
    ///
    /// When called from within a multi-threaded Tokio runtime the caller's
    /// runtime drives the transfers through `block_in_place`; otherwise the
    /// uploader's own runtime is used.
    pub fn upload_all(&self, tasks: &[TransferTask]) -> UploadReport {
        let future = self.transfer_all(tasks);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Resolve every task concurrently and collect the outcomes.
    ///
    /// Each key is transferred at most once per call; later tasks claiming
    /// the same key from another file resolve to a key conflict.
    /// One task's failure never prevents the others from completing.
    pub async fn transfer_all(&self, tasks: &[TransferTask]) -> UploadReport {
        if tasks.is_empty() {
            return UploadReport::default();
        }
        let (unique, conflicts) = collapse_by_key(tasks);
        let store = &self.store;
        let mut outcomes: Vec<(TransferTask, TaskResult)> = stream::iter(unique)
            .map(|task| async move {
                let result = transfer_one(store, &task).await;
                (task, result)
            })
            .buffer_unordered(self.width.get())
            .collect()
            .await;
        outcomes.extend(conflicts);

        let report = UploadReport::from_outcomes(outcomes);
        for (task, err) in report.failures() {
            warn!("transfer of {} to {} failed: {err}", task.source, task.key);
        }
        info!(
            "resolved {} transfers: {} uploaded, {} already present, {} failed",
            report.len(),
            report.uploaded(),
            report.already_present(),
            report.failed()
        );
        report
    }
}

/// Keep the first task queued for each key.
///
/// Later tasks repeating the same source are dropped. Later tasks naming a
/// different source resolve to [`TransferError::KeyConflict`] without reaching
/// the store.
fn collapse_by_key(tasks: &[TransferTask]) -> (Vec<TransferTask>, Vec<(TransferTask, TaskResult)>) {
    let mut owners: HashMap<&str, &Utf8Path> = HashMap::with_capacity(tasks.len());
    let mut unique = Vec::with_capacity(tasks.len());
    let mut conflicts = Vec::new();
    for task in tasks {
        match owners.entry(task.key.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(task.source.as_path());
                unique.push(task.clone());
            }
            Entry::Occupied(slot) if *slot.get() == task.source.as_path() => {
                debug!("dropping repeated transfer of {} to {}", task.source, task.key);
            }
            Entry::Occupied(slot) => {
                let err = TransferError::KeyConflict {
                    key: task.key.clone(),
                    path: task.source.clone(),
                    kept: slot.get().to_path_buf(),
                };
                conflicts.push((task.clone(), Err(err)));
            }
        }
    }
    (unique, conflicts)
}

async fn transfer_one<S>(store: &S, task: &TransferTask) -> TaskResult
where
    S: ObjectStore + ?Sized,
{
    match store.probe(&task.key).await {
        ProbeOutcome::Exists => {
            debug!("object {} already exists; skipping upload", task.key);
            return Ok(TaskOutcome::AlreadyPresent);
        }
        ProbeOutcome::NotFound => {}
        ProbeOutcome::Failed(source) => {
            return Err(TransferError::Probe {
                key: task.key.clone(),
                source,
            });
        }
    }

    let body = match tokio::fs::read(task.source.as_std_path()).await {
        Ok(body) => body,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(TransferError::MissingLocalAsset {
                key: task.key.clone(),
                path: task.source.clone(),
            });
        }
        Err(source) => {
            return Err(TransferError::ReadAsset {
                key: task.key.clone(),
                path: task.source.clone(),
                source,
            });
        }
    };

    let content_type = content_type_for(&task.key);
    store
        .put(&task.key, body, &content_type)
        .await
        .map_err(|source| TransferError::Upload {
            key: task.key.clone(),
            source,
        })?;
    debug!("uploaded {} as {}", task.source, task.key);
    Ok(TaskOutcome::Uploaded)
}

/// Content type for an object key, guessed from its extension.
pub(crate) fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_owned()
}

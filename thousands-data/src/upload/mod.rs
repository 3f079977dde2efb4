//! Concurrency-bounded transfer of image assets to object storage.
//!
//! A [`BulkUploader`] drives a list of [`TransferTask`]s against any
//! [`ObjectStore`]. Each task probes the destination key first: an existing
//! object counts as already satisfied, a missing object is uploaded from the
//! local file and any other probe failure is reported for that task alone.
//! The call returns only once every task has reached a terminal state.
//!
//! Tasks are collapsed by key before any request is made, so a key is
//! probed and uploaded at most once per call. A second task claiming an
//! already queued key from a different file is reported as a conflict.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use thousands_core::TransferTask;
//! use thousands_data::upload::{BulkUploader, test_support::MemoryObjectStore};
//!
//! let store = MemoryObjectStore::default();
//! store.insert("summits/s1_vid_0.jpg", b"jpeg".to_vec());
//! let uploader = BulkUploader::new(store, NonZeroUsize::MIN)?;
//!
//! let report = uploader.upload_all(&[TransferTask::new("/images/a.jpg", "summits/s1_vid_0.jpg")]);
//! assert_eq!(report.already_present(), 1);
//! assert!(report.is_clean());
//! # Ok::<(), thousands_data::upload::UploaderBuildError>(())
//! ```
//!
//! [`TransferTask`]: thousands_core::TransferTask

mod bulk;
mod error;
mod report;
mod s3;
mod store;

#[doc(hidden)]
pub mod test_support;

pub use bulk::{BulkUploader, DEFAULT_UPLOAD_CONCURRENCY};
pub use error::{StoreError, TransferError, UploaderBuildError};
pub use report::{TaskOutcome, TaskResult, UploadReport};
pub use s3::{DEFAULT_S3_REGION, S3Config, S3ObjectStore};
pub use store::{ObjectStore, ProbeOutcome};

#[cfg(test)]
mod tests;

//! Facade crate for the Thousands data migration.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the exporter, uploader and mirror store implementations.

#![forbid(unsafe_code)]

pub use thousands_core::{
    ClimbRow, Coordinates, ImageRef, ImageSize, PointDecodeError, RidgeMeta, RidgeRow,
    SummitDocument, SummitImageKeys, SummitKey, SummitRow, TransferTask, User, UserImage, UserRow,
    decode_point, image_key_stem, summit_image_keys, transliterate, user_image_key,
};

#[cfg(feature = "data")]
pub use thousands_data::{
    export::{ExportError, SummitExport, export_ridges, export_summits},
    mirror::{MirrorBatch, MirrorError, MirrorStore},
    source::{PgSource, RelationalSource, SourceError},
    upload::{
        BulkUploader, DEFAULT_UPLOAD_CONCURRENCY, ObjectStore, ProbeOutcome, S3Config,
        S3ObjectStore, StoreError, TaskOutcome, TransferError, UploadReport, UploaderBuildError,
    },
};

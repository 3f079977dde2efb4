//! Core domain types for the Thousands data migration.
//!
//! The relational snapshot is read as flat rows ([`RidgeRow`], [`SummitRow`],
//! [`UserRow`], [`ClimbRow`]) and reshaped into nested export documents
//! ([`RidgeMeta`], [`SummitDocument`]) plus the object keys that tie those
//! documents to uploaded images.
//!
//! Responsibilities:
//! - Decode textual point values into rounded [`Coordinates`].
//! - Derive deterministic object keys for summit and user images.
//! - Define the row, document and transfer types shared by the pipeline.
//!
//! Boundaries:
//! - No I/O lives here; reading, writing and uploading belong to
//!   `thousands-data`.
#![forbid(unsafe_code)]

pub mod asset_key;
pub mod model;
pub mod point;

pub use asset_key::{
    SummitImageKeys, image_key_stem, summit_image_keys, transliterate, user_image_key,
};
pub use model::{
    ClimbRow, ImageRef, ImageSize, RidgeMeta, RidgeRow, SummitDocument, SummitKey, SummitRow,
    TransferTask, User, UserImage, UserRow,
};
pub use point::{COORDINATE_PRECISION, Coordinates, PointDecodeError, decode_point};

//! Export of ridges and summits into the YAML document tree.
//!
//! The tree has one directory per ridge holding a `_meta.yaml` file and one
//! `<summit_id>.yaml` document per summit:
//!
//! ```text
//! <dest>/
//!   <ridge_id>/
//!     _meta.yaml
//!     <summit_id>.yaml
//! ```
//!
//! Nothing is ever overwritten. An existing directory or file at a computed
//! path is reported as [`ExportError::DestinationConflict`]; callers start
//! from an empty destination.
#![forbid(unsafe_code)]

mod document;
mod error;
mod ridges;
mod summits;

pub use error::ExportError;
pub use ridges::{RIDGE_META_FILE, export_ridges};
pub use summits::{SummitExport, SummitRun, export_summits, group_summit_rows};

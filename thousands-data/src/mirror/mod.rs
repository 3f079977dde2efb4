//! Embedded SQLite mirror of users, their images and climbs.
//!
//! The module is split into two focused submodules:
//! - [`schema`] materialises the mirror tables.
//! - [`writer`] inserts rows inside one transaction per entity family.
#![forbid(unsafe_code)]

mod error;
mod schema;
mod writer;

pub use error::MirrorError;
pub use schema::{SCHEMA_VERSION, initialise_schema};
pub use writer::{MirrorBatch, MirrorStore};

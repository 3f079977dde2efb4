//! Data access, export and transfer logic for the Thousands migration.
//!
//! Responsibilities:
//! - Read the relational snapshot through [`source::RelationalSource`].
//! - Write ridge and summit documents into the export tree.
//! - Upload image assets to object storage with bounded concurrency.
//! - Mirror users and climbs into the embedded SQLite store.
//!
//! Boundaries:
//! - Naming and row shapes live in `thousands-core`.
//! - Sequencing the entity families belongs to the command-line crate.
//!
//! Invariants:
//! - No global mutable state; clients and connections are passed in.
#![forbid(unsafe_code)]

pub mod export;
pub mod mirror;
pub mod source;
pub mod upload;

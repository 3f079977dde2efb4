//! Read access to the relational snapshot being migrated.
//!
//! [`RelationalSource`] exposes one ordered query per entity family. The
//! summit query joins images and must return every row of a summit
//! contiguously, main image first and then by descending image id; the
//! exporter relies on that order.

mod error;
mod postgres;

#[doc(hidden)]
pub mod test_support;

pub use error::SourceError;
pub use postgres::PgSource;

use thousands_core::{ClimbRow, RidgeRow, SummitRow, UserRow};

/// Ordered row queries for the four entity families.
pub trait RelationalSource {
    /// Every ridge.
    fn ridges(&self) -> Result<Vec<RidgeRow>, SourceError>;

    /// Summits left-joined with their images, grouped by summit.
    fn summits(&self) -> Result<Vec<SummitRow>, SourceError>;

    /// Every user with avatar file names.
    fn users(&self) -> Result<Vec<UserRow>, SourceError>;

    /// Every climb record.
    fn climbs(&self) -> Result<Vec<ClimbRow>, SourceError>;
}

impl<S: RelationalSource + ?Sized> RelationalSource for Box<S> {
    fn ridges(&self) -> Result<Vec<RidgeRow>, SourceError> {
        (**self).ridges()
    }

    fn summits(&self) -> Result<Vec<SummitRow>, SourceError> {
        (**self).summits()
    }

    fn users(&self) -> Result<Vec<UserRow>, SourceError> {
        (**self).users()
    }

    fn climbs(&self) -> Result<Vec<ClimbRow>, SourceError> {
        (**self).climbs()
    }
}

//! Fixed-row relational source for tests.

use thousands_core::{ClimbRow, RidgeRow, SummitRow, UserRow};

use super::{RelationalSource, SourceError};

/// [`RelationalSource`] serving rows held in memory.
///
/// Rows are returned exactly as given, so tests control the ordering the
/// exporter sees.
///
/// # Example
///
/// ```
/// use thousands_core::RidgeRow;
/// use thousands_data::source::RelationalSource;
/// use thousands_data::source::test_support::MemorySource;
///
/// let source = MemorySource::default().with_ridges(vec![RidgeRow {
///     id: "r1".into(),
///     name: "Ridge One".into(),
///     color: "red".into(),
/// }]);
/// assert_eq!(source.ridges().expect("ridges").len(), 1);
/// assert!(source.climbs().expect("climbs").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub ridges: Vec<RidgeRow>,
    pub summits: Vec<SummitRow>,
    pub users: Vec<UserRow>,
    pub climbs: Vec<ClimbRow>,
}

impl MemorySource {
    /// Replace the ridge rows.
    #[must_use]
    pub fn with_ridges(mut self, ridges: Vec<RidgeRow>) -> Self {
        self.ridges = ridges;
        self
    }

    /// Replace the joined summit rows.
    #[must_use]
    pub fn with_summits(mut self, summits: Vec<SummitRow>) -> Self {
        self.summits = summits;
        self
    }

    /// Replace the user rows.
    #[must_use]
    pub fn with_users(mut self, users: Vec<UserRow>) -> Self {
        self.users = users;
        self
    }

    /// Replace the climb rows.
    #[must_use]
    pub fn with_climbs(mut self, climbs: Vec<ClimbRow>) -> Self {
        self.climbs = climbs;
        self
    }
}

impl RelationalSource for MemorySource {
    fn ridges(&self) -> Result<Vec<RidgeRow>, SourceError> {
        Ok(self.ridges.clone())
    }

    fn summits(&self) -> Result<Vec<SummitRow>, SourceError> {
        Ok(self.summits.clone())
    }

    fn users(&self) -> Result<Vec<UserRow>, SourceError> {
        Ok(self.users.clone())
    }

    fn climbs(&self) -> Result<Vec<ClimbRow>, SourceError> {
        Ok(self.climbs.clone())
    }
}

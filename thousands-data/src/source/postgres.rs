//! Postgres-backed [`RelationalSource`] built on `sqlx`.

use std::fmt;
use std::future::Future;

use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use thousands_core::{ClimbRow, RidgeRow, SummitRow, UserRow, decode_point};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::{RelationalSource, SourceError};

const RIDGES_SQL: &str = "
    SELECT id::text AS id, name::text AS name, color::text AS color
    FROM ridges
    ORDER BY id";

const SUMMITS_SQL: &str = "
    SELECT s.id::text AS id,
           s.ridge_id::text AS ridge_id,
           s.name::text AS name,
           s.name_alt::text AS name_alt,
           s.height::integer AS height,
           s.description::text AS description,
           s.interpretation::text AS interpretation,
           s.coordinates::text AS coordinates,
           si.image::text AS image,
           si.preview::text AS preview,
           si.comment::text AS comment
    FROM summits s
    LEFT JOIN summits_images si ON s.id = si.summit_id
    ORDER BY s.id, si.main DESC, si.image DESC";

const USERS_SQL: &str = "
    SELECT id::bigint AS id,
           oauth_id::text AS oauth_id,
           src::bigint AS src,
           name::text AS name,
           image::text AS image,
           preview::text AS preview
    FROM users
    ORDER BY id";

const CLIMBS_SQL: &str = "
    SELECT user_id::bigint AS user_id,
           summit_id::text AS summit_id,
           comment::text AS comment,
           year::integer AS year,
           month::integer AS month,
           day::integer AS day
    FROM climbs";

/// Blocking adapter over a single-connection Postgres pool.
///
/// The source owns a current-thread Tokio runtime so synchronous callers can
/// read rows without managing an executor. The same runtime detection as
/// the uploader applies when called from inside a multi-threaded runtime.
pub struct PgSource {
    pool: PgPool,
    runtime: Runtime,
}

impl fmt::Debug for PgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSource")
            .field("pool", &self.pool)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl PgSource {
    /// Connect to the database named by `dsn`.
    ///
    /// # Errors
    ///
    /// Fails when the runtime cannot be built or the connection is refused.
    pub fn connect(dsn: &str) -> Result<Self, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceError::Runtime)?;
        let pool = runtime
            .block_on(PgPoolOptions::new().max_connections(1).connect(dsn))
            .map_err(SourceError::Connect)?;
        info!("connected to the relational source");
        Ok(Self { pool, runtime })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    fn fetch<R>(&self, sql: &'static str, operation: &'static str) -> Result<Vec<R>, SourceError>
    where
        R: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        self.block_on(sqlx::query_as::<_, R>(sql).fetch_all(&self.pool))
            .map_err(|source| SourceError::Query { operation, source })
    }
}

impl RelationalSource for PgSource {
    fn ridges(&self) -> Result<Vec<RidgeRow>, SourceError> {
        let records: Vec<RidgeRecord> = self.fetch(RIDGES_SQL, "query ridges")?;
        Ok(records.into_iter().map(RidgeRecord::into_row).collect())
    }

    fn summits(&self) -> Result<Vec<SummitRow>, SourceError> {
        let records: Vec<SummitRecord> = self.fetch(SUMMITS_SQL, "query summits")?;
        records.into_iter().map(SummitRecord::into_row).collect()
    }

    fn users(&self) -> Result<Vec<UserRow>, SourceError> {
        let records: Vec<UserRecord> = self.fetch(USERS_SQL, "query users")?;
        Ok(records.into_iter().map(UserRecord::into_row).collect())
    }

    fn climbs(&self) -> Result<Vec<ClimbRow>, SourceError> {
        let records: Vec<ClimbRecord> = self.fetch(CLIMBS_SQL, "query climbs")?;
        Ok(records.into_iter().map(ClimbRecord::into_row).collect())
    }
}

#[derive(Debug, FromRow)]
struct RidgeRecord {
    id: String,
    name: String,
    color: String,
}

impl RidgeRecord {
    fn into_row(self) -> RidgeRow {
        RidgeRow {
            id: self.id,
            name: self.name,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct SummitRecord {
    id: String,
    ridge_id: String,
    name: String,
    name_alt: Option<String>,
    height: i32,
    description: Option<String>,
    interpretation: Option<String>,
    coordinates: Option<String>,
    image: Option<String>,
    preview: Option<String>,
    comment: Option<String>,
}

impl SummitRecord {
    fn into_row(self) -> Result<SummitRow, SourceError> {
        let coordinates = decode_point(self.coordinates.as_deref()).map_err(|source| {
            SourceError::Coordinates {
                summit_id: self.id.clone(),
                source,
            }
        })?;
        Ok(SummitRow {
            id: self.id,
            ridge_id: self.ridge_id,
            name: self.name,
            name_alt: self.name_alt,
            height: self.height,
            description: self.description,
            interpretation: self.interpretation,
            coordinates,
            image: self.image,
            preview: self.preview,
            comment: self.comment,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: i64,
    oauth_id: String,
    src: i64,
    name: String,
    image: Option<String>,
    preview: Option<String>,
}

impl UserRecord {
    fn into_row(self) -> UserRow {
        UserRow {
            id: self.id,
            oauth_id: self.oauth_id,
            src: self.src,
            name: self.name,
            image: self.image,
            preview: self.preview,
        }
    }
}

#[derive(Debug, FromRow)]
struct ClimbRecord {
    user_id: i64,
    summit_id: String,
    comment: Option<String>,
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
}

impl ClimbRecord {
    fn into_row(self) -> ClimbRow {
        ClimbRow {
            user_id: self.user_id,
            summit_id: self.summit_id,
            comment: self.comment,
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn record() -> SummitRecord {
        SummitRecord {
            id: "s1".into(),
            ridge_id: "r1".into(),
            name: "Peak".into(),
            name_alt: None,
            height: 4000,
            description: None,
            interpretation: None,
            coordinates: Some("(45.12345,7.6789)".into()),
            image: Some("a.jpg".into()),
            preview: Some("a_p.jpg".into()),
            comment: Some("Вид".into()),
        }
    }

    #[rstest]
    fn summit_records_decode_coordinates(record: SummitRecord) {
        let row = record.into_row().expect("valid record");
        let point = row.coordinates.expect("coordinates present");
        assert_eq!((point.x(), point.y()), (45.1235, 7.6789));
        assert_eq!(row.comment.as_deref(), Some("Вид"));
    }

    #[rstest]
    fn null_coordinates_stay_absent(mut record: SummitRecord) {
        record.coordinates = None;
        assert_eq!(record.into_row().expect("valid record").coordinates, None);
    }

    #[rstest]
    fn malformed_coordinates_name_the_summit(mut record: SummitRecord) {
        record.coordinates = Some("(1,2,3)".into());
        let err = record.into_row().expect_err("malformed point");
        match err {
            SourceError::Coordinates { summit_id, .. } => assert_eq!(summit_id, "s1"),
            other => panic!("expected coordinate error, got {other:?}"),
        }
    }

    #[test]
    fn summit_query_orders_images_within_each_summit() {
        assert!(SUMMITS_SQL.contains("ORDER BY s.id, si.main DESC, si.image DESC"));
    }
}

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, Row, Transaction};
use thousands_core::{ClimbRow, ImageSize, User, UserImage};

use super::error::MirrorError;
use super::schema::initialise_schema;

/// Handle on the embedded mirror database.
///
/// The connection is owned by a single thread; writes go through a
/// [`MirrorBatch`] so each entity family commits as one unit.
#[derive(Debug)]
pub struct MirrorStore {
    connection: Connection,
    path: Option<Utf8PathBuf>,
}

impl MirrorStore {
    /// Open (or create) the database at `path`, creating its parent directory
    /// and the mirror schema when missing.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created, the database cannot be
    /// opened or the schema does not match.
    pub fn open(path: &Utf8Path) -> Result<Self, MirrorError> {
        thousands_fs::ensure_parent_dir(path).map_err(|source| MirrorError::CreateParent {
            path: path.to_path_buf(),
            source,
        })?;
        let connection = Connection::open(path).map_err(|source| MirrorError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory mirror.
    ///
    /// # Errors
    ///
    /// Fails when SQLite cannot allocate the database or create the schema.
    pub fn open_in_memory() -> Result<Self, MirrorError> {
        let connection = Connection::open_in_memory().map_err(|source| MirrorError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(connection, None)
    }

    fn with_connection(
        mut connection: Connection,
        path: Option<Utf8PathBuf>,
    ) -> Result<Self, MirrorError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection, path })
    }

    /// Location of the database file, if it lives on disk.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Start a batch of writes committed together.
    ///
    /// # Errors
    ///
    /// Fails when SQLite cannot open a transaction.
    pub fn begin(&mut self) -> Result<MirrorBatch<'_>, MirrorError> {
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| MirrorError::Sqlite {
                operation: "begin mirror transaction",
                source,
            })?;
        Ok(MirrorBatch { transaction })
    }

    /// Every mirrored user ordered by id.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot run.
    pub fn users(&self) -> Result<Vec<User>, MirrorError> {
        self.query(
            "SELECT id, oauth_id, src, name FROM users ORDER BY id",
            "read users",
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    oauth_id: row.get(1)?,
                    src: row.get(2)?,
                    name: row.get(3)?,
                })
            },
        )
    }

    /// Every user image row in insertion order.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot run or a stored size code is unknown.
    pub fn user_images(&self) -> Result<Vec<UserImage>, MirrorError> {
        let raw = self.query(
            "SELECT user_id, size, url FROM user_images ORDER BY rowid",
            "read user images",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(user_id, code, url)| {
                let size =
                    ImageSize::from_code(&code).ok_or(MirrorError::UnknownImageSize { code })?;
                Ok(UserImage { user_id, size, url })
            })
            .collect()
    }

    /// Every climb row in insertion order.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot run.
    pub fn climbs(&self) -> Result<Vec<ClimbRow>, MirrorError> {
        self.query(
            "SELECT user_id, summit_id, comment, year, month, day FROM climbs ORDER BY rowid",
            "read climbs",
            |row| {
                Ok(ClimbRow {
                    user_id: row.get(0)?,
                    summit_id: row.get(1)?,
                    comment: row.get(2)?,
                    year: row.get(3)?,
                    month: row.get(4)?,
                    day: row.get(5)?,
                })
            },
        )
    }

    fn query<T>(
        &self,
        sql: &str,
        operation: &'static str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, MirrorError> {
        let wrap = |source| MirrorError::Sqlite { operation, source };
        let mut statement = self.connection.prepare(sql).map_err(wrap)?;
        let rows = statement.query_map([], map).map_err(wrap)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(wrap)
    }
}

/// Writes for one entity family, committed together.
///
/// Dropping a batch without calling [`MirrorBatch::commit`] rolls every
/// write back.
#[derive(Debug)]
pub struct MirrorBatch<'conn> {
    transaction: Transaction<'conn>,
}

impl MirrorBatch<'_> {
    /// Insert a user unless one with the same id already exists.
    ///
    /// Returns `true` when a row was written. The first write for an id wins.
    ///
    /// # Errors
    ///
    /// Fails when SQLite rejects the statement.
    pub fn insert_user(&self, user: &User) -> Result<bool, MirrorError> {
        let mut statement = self
            .transaction
            .prepare_cached(
                "INSERT INTO users (id, oauth_id, src, name) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING",
            )
            .map_err(|source| MirrorError::Sqlite {
                operation: "prepare insert user",
                source,
            })?;
        let changed = statement
            .execute((user.id, user.oauth_id.as_str(), user.src, user.name.as_str()))
            .map_err(|source| MirrorError::Sqlite {
                operation: "insert user",
                source,
            })?;
        Ok(changed > 0)
    }

    /// Append a user image row.
    ///
    /// # Errors
    ///
    /// Fails when SQLite rejects the statement.
    pub fn insert_user_image(&self, image: &UserImage) -> Result<(), MirrorError> {
        let mut statement = self
            .transaction
            .prepare_cached("INSERT INTO user_images (user_id, size, url) VALUES (?1, ?2, ?3)")
            .map_err(|source| MirrorError::Sqlite {
                operation: "prepare insert user image",
                source,
            })?;
        statement
            .execute((image.user_id, image.size.code(), image.url.as_str()))
            .map_err(|source| MirrorError::Sqlite {
                operation: "insert user image",
                source,
            })?;
        Ok(())
    }

    /// Append a climb row.
    ///
    /// # Errors
    ///
    /// Fails when SQLite rejects the statement.
    pub fn insert_climb(&self, climb: &ClimbRow) -> Result<(), MirrorError> {
        let mut statement = self
            .transaction
            .prepare_cached(
                "INSERT INTO climbs (user_id, summit_id, comment, year, month, day)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|source| MirrorError::Sqlite {
                operation: "prepare insert climb",
                source,
            })?;
        statement
            .execute((
                climb.user_id,
                climb.summit_id.as_str(),
                climb.comment.as_deref(),
                climb.year,
                climb.month,
                climb.day,
            ))
            .map_err(|source| MirrorError::Sqlite {
                operation: "insert climb",
                source,
            })?;
        Ok(())
    }

    /// Delete every user image row inside this batch.
    ///
    /// Association rows are append-only, so reruns against the same database
    /// clear them before writing to avoid duplicates. Users are kept. The
    /// delete is rolled back with the rest of the batch.
    ///
    /// # Errors
    ///
    /// Fails when SQLite rejects the statement.
    pub fn clear_user_images(&self) -> Result<usize, MirrorError> {
        self.clear("DELETE FROM user_images", "delete user images")
    }

    /// Delete every climb row inside this batch.
    ///
    /// # Errors
    ///
    /// Fails when SQLite rejects the statement.
    pub fn clear_climbs(&self) -> Result<usize, MirrorError> {
        self.clear("DELETE FROM climbs", "delete climbs")
    }

    fn clear(&self, sql: &str, operation: &'static str) -> Result<usize, MirrorError> {
        self.transaction
            .execute(sql, [])
            .map_err(|source| MirrorError::Sqlite { operation, source })
    }

    /// Commit every write in the batch.
    ///
    /// # Errors
    ///
    /// Fails when SQLite cannot commit; the batch is rolled back.
    pub fn commit(self) -> Result<(), MirrorError> {
        self.transaction
            .commit()
            .map_err(|source| MirrorError::Sqlite {
                operation: "commit mirror transaction",
                source,
            })
    }
}

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::error::MirrorError;

/// Version recorded in `mirror_schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the mirror tables inside an open SQLite database.
///
/// Existing installations must already match [`SCHEMA_VERSION`]; mismatches
/// are rejected so migrations can be applied explicitly.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use thousands_data::mirror::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create mirror schema");
/// initialise_schema(&mut conn).expect("initialising twice is harmless");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master
///          WHERE type = 'table' AND name IN ('users', 'user_images', 'climbs')",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 3);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), MirrorError> {
    let transaction = connection
        .transaction()
        .map_err(|source| MirrorError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| MirrorError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), MirrorError> {
    run_migration_step(
        transaction,
        "create users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            oauth_id TEXT NOT NULL,
            src INTEGER NOT NULL,
            name TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create user_images",
        "CREATE TABLE IF NOT EXISTS user_images (
            user_id INTEGER NOT NULL,
            size TEXT NOT NULL CHECK (size IN ('M', 'S')),
            url TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create climbs",
        "CREATE TABLE IF NOT EXISTS climbs (
            user_id INTEGER NOT NULL,
            summit_id TEXT NOT NULL,
            comment TEXT,
            year INTEGER,
            month INTEGER,
            day INTEGER
        )",
    )?;
    run_migration_step(
        transaction,
        "index user_images",
        "CREATE INDEX IF NOT EXISTS idx_user_images_user ON user_images(user_id)",
    )?;
    run_migration_step(
        transaction,
        "index climbs",
        "CREATE INDEX IF NOT EXISTS idx_climbs_summit ON climbs(summit_id, user_id)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), MirrorError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS mirror_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM mirror_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| MirrorError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(MirrorError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO mirror_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| MirrorError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), MirrorError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| MirrorError::Migration { step, source })
}

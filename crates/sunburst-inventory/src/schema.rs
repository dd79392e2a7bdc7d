//! Catalog schema revisions and migration.

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::InventoryError;

/// What to do when the on-disk schema is older than the binary expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UpgradePolicy {
    PerformUpgrades,
    FailInsteadOfUpgrading,
}

pub(crate) struct SchemaRevision {
    pub version: u64,
    pub statements: &'static str,
}

pub(crate) const SCHEMA_VERSION_CURRENT: u64 = 1;

pub(crate) const SCHEMA_REVISIONS: &[SchemaRevision] = &[SchemaRevision {
    version: 1,
    statements: r"
        CREATE TABLE schema_version (
            version_number INTEGER NOT NULL
        );

        CREATE TABLE blobs (
            id             INTEGER PRIMARY KEY,
            hash_algorithm TEXT    NOT NULL,
            hash           TEXT    NOT NULL,
            size           INTEGER NOT NULL,
            content_type   TEXT    NOT NULL,
            UNIQUE (hash_algorithm, hash)
        );

        CREATE TABLE packages (
            id                INTEGER PRIMARY KEY,
            name              TEXT    NOT NULL,
            version_major     INTEGER NOT NULL,
            version_minor     INTEGER NOT NULL,
            version_patch     INTEGER NOT NULL,
            version_qualifier TEXT    NOT NULL,
            updated           TEXT    NOT NULL,
            UNIQUE (name, version_major, version_minor, version_patch,
                    version_qualifier)
        );

        CREATE TABLE package_blobs (
            package_id INTEGER NOT NULL
                REFERENCES packages (id) ON DELETE CASCADE,
            blob_id    INTEGER NOT NULL
                REFERENCES blobs (id) ON DELETE RESTRICT,
            path       TEXT    NOT NULL,
            UNIQUE (package_id, path)
        );

        CREATE TABLE package_meta (
            package_id INTEGER NOT NULL
                REFERENCES packages (id) ON DELETE CASCADE,
            meta_key   TEXT    NOT NULL,
            meta_value TEXT    NOT NULL,
            UNIQUE (package_id, meta_key)
        );
    ",
}];

/// Bring the database up to the current schema version, or verify it when
/// upgrades are not permitted. Upgrades run inside a single exclusive
/// transaction.
pub(crate) fn migrate(
    connection: &Connection,
    policy: UpgradePolicy,
) -> Result<(), InventoryError> {
    let current = schema_version_get(connection)?;

    if let Some(found) = current {
        if found > SCHEMA_VERSION_CURRENT {
            return Err(InventoryError::SchemaTooNew {
                found,
                supported: SCHEMA_VERSION_CURRENT,
            });
        }
        if found == SCHEMA_VERSION_CURRENT {
            return Ok(());
        }
    }

    match policy {
        UpgradePolicy::FailInsteadOfUpgrading => {
            Err(InventoryError::SchemaTooOld {
                found: current.unwrap_or(0),
                supported: SCHEMA_VERSION_CURRENT,
            })
        }
        UpgradePolicy::PerformUpgrades => {
            connection.execute_batch("BEGIN EXCLUSIVE")?;
            match apply_revisions(connection, current) {
                Ok(()) => {
                    connection.execute_batch("COMMIT")?;
                    Ok(())
                }
                Err(e) => {
                    let _ = connection.execute_batch("ROLLBACK");
                    Err(e)
                }
            }
        }
    }
}

fn apply_revisions(
    connection: &Connection,
    current: Option<u64>,
) -> Result<(), InventoryError> {
    let from = current.unwrap_or(0);
    for revision in SCHEMA_REVISIONS {
        if revision.version <= from {
            continue;
        }
        debug!(version = revision.version, "applying schema revision");
        connection.execute_batch(revision.statements)?;
    }
    schema_version_set(connection, current, SCHEMA_VERSION_CURRENT)?;
    Ok(())
}

fn schema_version_get(
    connection: &Connection,
) -> Result<Option<u64>, InventoryError> {
    let table_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM sqlite_master \
         WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Ok(None);
    }

    // A present but empty schema_version table is corruption; QueryReturnedNoRows
    // surfaces as a database error.
    let version: i64 = connection.query_row(
        "SELECT version_number FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(Some(version.unsigned_abs()))
}

fn schema_version_set(
    connection: &Connection,
    previous: Option<u64>,
    version: u64,
) -> Result<(), InventoryError> {
    let statement = match previous {
        None => "INSERT INTO schema_version (version_number) VALUES (?1)",
        Some(_) => "UPDATE schema_version SET version_number = ?1",
    };
    connection.execute(statement, params![version as i64])?;
    Ok(())
}

/// Overwrite the recorded schema version; test hook for upgrade-policy
/// checks.
#[cfg(test)]
pub(crate) fn schema_version_override(
    connection: &Connection,
    version: u64,
) -> Result<(), InventoryError> {
    schema_version_set(connection, Some(0), version)
}

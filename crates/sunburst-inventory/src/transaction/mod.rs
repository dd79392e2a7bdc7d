//! The transaction: one connection, one unit of atomicity.
//!
//! A transaction owns a single database connection with an explicitly
//! opened SQL transaction, plus a handle to the blob store. Catalog rows
//! and blob files move together: commit publishes both, rollback leaves
//! neither (transient upload files are cleaned up before errors return).
//!
//! The module is split by responsibility: blob operations in `blobs`,
//! package operations in `packages`.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use rusqlite::Row;
use sunburst_model::{
    Blob, Hash, HashAlgorithm, Package, PackageIdentifier, PackageName,
    Version, VersionQualifier, VirtualPath,
};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{trace, warn};

use crate::api::{TransactionReadable, TransactionWritable};
use crate::blob_store::BlobStore;
use crate::error::InventoryError;
use crate::inventory::open_connection;

mod blobs;
mod packages;

/// The default transaction implementation.
///
/// State machine: `Open -> (Commit | Rollback | Close) -> Done`. Every
/// operation on a completed transaction fails with `error-invalid-state`;
/// `close` after commit or rollback is a no-op. Dropping an open
/// transaction rolls it back.
pub struct Transaction {
    connection: rusqlite::Connection,
    blob_store: BlobStore,
    state: State,
    // Blob files created by this transaction; removed again if the catalog
    // rows that justify them are rolled back.
    written_blobs: Vec<Hash>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Open,
    Done,
}

impl Transaction {
    pub(crate) fn open(
        db_file: &Path,
        blob_store: BlobStore,
        read_only: bool,
    ) -> Result<Self, InventoryError> {
        let connection = open_connection(db_file, read_only)?;
        // DEFERRED keeps readers from taking a write lock they never need.
        connection.execute_batch(if read_only {
            "BEGIN DEFERRED"
        } else {
            "BEGIN IMMEDIATE"
        })?;
        trace!(read_only, "transaction opened");
        Ok(Self {
            connection,
            blob_store,
            state: State::Open,
            written_blobs: Vec::new(),
        })
    }

    fn check_open(&self) -> Result<(), InventoryError> {
        match self.state {
            State::Open => Ok(()),
            State::Done => Err(InventoryError::InvalidState),
        }
    }

    fn discard_written_blobs(&mut self) {
        for hash in std::mem::take(&mut self.written_blobs) {
            if let Err(e) = self.blob_store.delete(&hash) {
                warn!(
                    hash = %hash,
                    error = %e,
                    "failed to remove uncommitted blob file"
                );
            }
        }
    }
}

impl TransactionReadable for Transaction {
    fn packages(
        &self,
    ) -> Result<BTreeSet<PackageIdentifier>, InventoryError> {
        self.check_open()?;
        self.packages_query()
    }

    fn packages_updated_since(
        &self,
        time: OffsetDateTime,
    ) -> Result<BTreeSet<PackageIdentifier>, InventoryError> {
        self.check_open()?;
        self.packages_updated_since_query(time)
    }

    fn package_get(
        &self,
        identifier: &PackageIdentifier,
    ) -> Result<Option<Package>, InventoryError> {
        self.check_open()?;
        self.package_get_query(identifier)
    }

    fn blob_get(&self, hash: &Hash) -> Result<Option<Blob>, InventoryError> {
        self.check_open()?;
        self.blob_get_query(hash)
    }

    fn blob_list(&self) -> Result<BTreeMap<Hash, Blob>, InventoryError> {
        self.check_open()?;
        self.blob_list_query()
    }

    fn blobs_unreferenced(
        &self,
    ) -> Result<BTreeMap<Hash, Blob>, InventoryError> {
        self.check_open()?;
        self.blobs_unreferenced_query()
    }

    fn blob_file(
        &self,
        identifier: &PackageIdentifier,
        path: &VirtualPath,
    ) -> Result<PathBuf, InventoryError> {
        self.check_open()?;
        self.blob_file_query(identifier, path)
    }

    fn close(&mut self) -> Result<(), InventoryError> {
        if self.state == State::Done {
            return Ok(());
        }
        self.state = State::Done;
        let result = self.connection.execute_batch("ROLLBACK");
        self.discard_written_blobs();
        result.map_err(|e| InventoryError::Closing(vec![e.into()]))
    }
}

impl TransactionWritable for Transaction {
    fn blob_add(
        &mut self,
        blob: &Blob,
        stream: &mut dyn Read,
    ) -> Result<(), InventoryError> {
        self.check_open()?;
        self.blob_add_inner(blob, stream)
    }

    fn blob_remove(&mut self, blob: &Blob) -> Result<(), InventoryError> {
        self.check_open()?;
        self.blob_remove_inner(blob)
    }

    fn package_put(
        &mut self,
        package: &Package,
    ) -> Result<(), InventoryError> {
        self.check_open()?;
        self.package_put_inner(package)
    }

    fn commit(&mut self) -> Result<(), InventoryError> {
        self.check_open()?;
        self.connection.execute_batch("COMMIT")?;
        self.state = State::Done;
        self.written_blobs.clear();
        trace!("transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), InventoryError> {
        self.check_open()?;
        self.connection.execute_batch("ROLLBACK")?;
        self.state = State::Done;
        self.discard_written_blobs();
        trace!("transaction rolled back");
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == State::Open {
            if let Err(e) = self.connection.execute_batch("ROLLBACK") {
                warn!(error = %e, "failed to roll back dropped transaction");
            }
            self.discard_written_blobs();
        }
    }
}

/// Render a timestamp in fixed-width RFC 3339 UTC. Constant width keeps
/// lexicographic comparison of the `updated` column consistent with
/// chronological order.
fn format_time(time: OffsetDateTime) -> Result<String, InventoryError> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
    );
    time.to_offset(UtcOffset::UTC)
        .format(&format)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

fn conversion_error(
    index: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(error),
    )
}

// Column order: name, version_major, version_minor, version_patch,
// version_qualifier.
fn identifier_from_row(row: &Row<'_>) -> rusqlite::Result<PackageIdentifier> {
    let name: String = row.get(0)?;
    let major: u32 = row.get(1)?;
    let minor: u32 = row.get(2)?;
    let patch: u32 = row.get(3)?;
    let qualifier: String = row.get(4)?;

    let name = PackageName::new(name).map_err(|e| conversion_error(0, e))?;
    let version = if qualifier.is_empty() {
        Version::new(major, minor, patch)
    } else {
        let qualifier = VersionQualifier::new(qualifier)
            .map_err(|e| conversion_error(4, e))?;
        Version::with_qualifier(major, minor, patch, qualifier)
    };
    Ok(PackageIdentifier::new(name, version))
}

fn hash_from_columns(
    algorithm: &str,
    value: &str,
) -> rusqlite::Result<Hash> {
    let algorithm: HashAlgorithm =
        algorithm.parse().map_err(|e| conversion_error(0, e))?;
    let value = hex::decode(value).map_err(|e| conversion_error(1, e))?;
    Hash::new(algorithm, value).map_err(|e| conversion_error(1, e))
}

// Column order: hash_algorithm, hash, size, content_type.
fn blob_from_row(row: &Row<'_>) -> rusqlite::Result<Blob> {
    let algorithm: String = row.get(0)?;
    let value: String = row.get(1)?;
    let size: u64 = row.get(2)?;
    let content_type: String = row.get(3)?;
    Ok(Blob {
        size,
        content_type,
        hash: hash_from_columns(&algorithm, &value)?,
    })
}

fn version_fields(version: &Version) -> (i64, i64, i64, &str) {
    (
        i64::from(version.major()),
        i64::from(version.minor()),
        i64::from(version.patch()),
        version.qualifier().map_or("", VersionQualifier::as_str),
    )
}

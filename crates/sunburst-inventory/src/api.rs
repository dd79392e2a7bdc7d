//! The inventory capability traits and configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sunburst_model::{Blob, Hash, Package, PackageIdentifier, VirtualPath};
use time::OffsetDateTime;

use crate::error::InventoryError;

/// The configuration for an inventory: the base directory that holds the
/// catalog database and the blob tree.
#[derive(Clone, Debug)]
pub struct InventoryConfiguration {
    base: PathBuf,
}

impl InventoryConfiguration {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The default base directory: `$SUNBURST_PATH` if set, otherwise
    /// `~/.sunburst`.
    pub fn default_base() -> Result<PathBuf, InventoryError> {
        if let Some(path) = env::var_os("SUNBURST_PATH") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs_next::home_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "failed to resolve a home directory for the inventory",
            )
        })?;
        Ok(home.join(".sunburst"))
    }
}

/// The read capability of a transaction.
pub trait TransactionReadable {
    /// All package identifiers in the catalog.
    fn packages(&self)
        -> Result<BTreeSet<PackageIdentifier>, InventoryError>;

    /// The identifiers of packages whose `updated` timestamp is strictly
    /// later than the given time.
    fn packages_updated_since(
        &self,
        time: OffsetDateTime,
    ) -> Result<BTreeSet<PackageIdentifier>, InventoryError>;

    /// Retrieve a package, if one exists with the given identifier.
    fn package_get(
        &self,
        identifier: &PackageIdentifier,
    ) -> Result<Option<Package>, InventoryError>;

    /// Retrieve a blob record, if one exists with the given hash.
    fn blob_get(&self, hash: &Hash) -> Result<Option<Blob>, InventoryError>;

    /// All blobs in the catalog.
    fn blob_list(&self) -> Result<BTreeMap<Hash, Blob>, InventoryError>;

    /// The blobs not referenced by any package entry; these are safe to
    /// remove.
    fn blobs_unreferenced(
        &self,
    ) -> Result<BTreeMap<Hash, Blob>, InventoryError>;

    /// The on-disk file for the entry at `path` within the given package.
    fn blob_file(
        &self,
        identifier: &PackageIdentifier,
        path: &VirtualPath,
    ) -> Result<PathBuf, InventoryError>;

    /// End the transaction, rolling back if it is still open. Calling
    /// `close` on a completed transaction is a no-op.
    fn close(&mut self) -> Result<(), InventoryError>;
}

/// The write capability of a transaction.
pub trait TransactionWritable: TransactionReadable {
    /// Stream a blob into the store, verifying its hash, and record it in
    /// the catalog. Re-adding an existing blob is idempotent.
    fn blob_add(
        &mut self,
        blob: &Blob,
        stream: &mut dyn Read,
    ) -> Result<(), InventoryError>;

    /// Remove a blob from the catalog and delete its file. Fails with
    /// `error-blob-referenced` while any package entry references it.
    fn blob_remove(&mut self, blob: &Blob) -> Result<(), InventoryError>;

    /// Install a package. Non-snapshot identifiers may be installed once;
    /// snapshot identifiers atomically replace their previous contents.
    fn package_put(&mut self, package: &Package)
        -> Result<(), InventoryError>;

    /// Commit the transaction, making all writes visible atomically.
    fn commit(&mut self) -> Result<(), InventoryError>;

    /// Roll back the transaction.
    fn rollback(&mut self) -> Result<(), InventoryError>;
}

/// The read capability of an inventory: hand out readable transactions.
pub trait InventoryReadable {
    fn configuration(&self) -> &InventoryConfiguration;

    fn open_transaction_readable(
        &self,
    ) -> Result<Box<dyn TransactionReadable>, InventoryError>;
}

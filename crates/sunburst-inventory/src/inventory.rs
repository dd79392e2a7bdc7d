//! Opening and closing inventories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::api::{
    InventoryConfiguration, InventoryReadable, TransactionReadable,
};
use crate::blob_store::BlobStore;
use crate::error::InventoryError;
use crate::schema::{migrate, UpgradePolicy};
use crate::transaction::Transaction;

const DATABASE_FILENAME: &str = "sunburst.db";

/// A read-write inventory.
#[derive(Debug)]
pub struct Inventory {
    shared: Shared,
}

/// A read-only inventory: the same on-disk state, exposing only readable
/// transactions.
#[derive(Debug)]
pub struct InventoryReadOnly {
    shared: Shared,
}

#[derive(Debug)]
struct Shared {
    configuration: InventoryConfiguration,
    db_file: PathBuf,
    blob_store: BlobStore,
}

impl Shared {
    fn new(configuration: InventoryConfiguration) -> Self {
        let db_file = configuration.base().join(DATABASE_FILENAME);
        let blob_store = BlobStore::open(configuration.base());
        Self {
            configuration,
            db_file,
            blob_store,
        }
    }
}

impl Inventory {
    /// Open an inventory in read-write mode, creating the base directory
    /// and database on first use and applying any required schema
    /// upgrades.
    pub fn open_read_write(
        configuration: InventoryConfiguration,
    ) -> Result<Self, InventoryError> {
        fs::create_dir_all(configuration.base())?;
        let shared = Shared::new(configuration);

        let connection = open_connection(&shared.db_file, false)?;
        connection.pragma_update(None, "journal_mode", "WAL")?;
        migrate(&connection, UpgradePolicy::PerformUpgrades)?;

        debug!(
            base = %shared.configuration.base().display(),
            "inventory opened read-write"
        );
        Ok(Self { shared })
    }

    /// Open an inventory in read-only mode. Fails if the database does not
    /// exist or its schema version does not match the supported version.
    pub fn open_read_only(
        configuration: InventoryConfiguration,
    ) -> Result<InventoryReadOnly, InventoryError> {
        let shared = Shared::new(configuration);

        let connection = open_connection(&shared.db_file, true)?;
        migrate(&connection, UpgradePolicy::FailInsteadOfUpgrading)?;

        debug!(
            base = %shared.configuration.base().display(),
            "inventory opened read-only"
        );
        Ok(InventoryReadOnly { shared })
    }

    /// Open a read-write transaction.
    pub fn open_transaction(&self) -> Result<Transaction, InventoryError> {
        Transaction::open(&self.shared.db_file, self.shared.blob_store.clone(), false)
    }

    /// Release the inventory. Transactions hold their own connections and
    /// close independently.
    pub fn close(self) {}
}

impl InventoryReadOnly {
    /// Release the inventory.
    pub fn close(self) {}
}

impl InventoryReadable for Inventory {
    fn configuration(&self) -> &InventoryConfiguration {
        &self.shared.configuration
    }

    fn open_transaction_readable(
        &self,
    ) -> Result<Box<dyn TransactionReadable>, InventoryError> {
        Ok(Box::new(Transaction::open(
            &self.shared.db_file,
            self.shared.blob_store.clone(),
            true,
        )?))
    }
}

impl InventoryReadable for InventoryReadOnly {
    fn configuration(&self) -> &InventoryConfiguration {
        &self.shared.configuration
    }

    fn open_transaction_readable(
        &self,
    ) -> Result<Box<dyn TransactionReadable>, InventoryError> {
        Ok(Box::new(Transaction::open(
            &self.shared.db_file,
            self.shared.blob_store.clone(),
            true,
        )?))
    }
}

pub(crate) fn open_connection(
    db_file: &Path,
    read_only: bool,
) -> Result<Connection, InventoryError> {
    let connection = if read_only {
        Connection::open_with_flags(
            db_file,
            OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?
    } else {
        Connection::open(db_file)?
    };
    connection.busy_timeout(Duration::from_secs(10))?;
    connection.pragma_update(None, "foreign_keys", "ON")?;
    Ok(connection)
}

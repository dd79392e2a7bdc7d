//! Inventory unit tests.

use anyhow::Result;
use std::path::Path;
use sunburst_model::{Blob, Hash, HashAlgorithm};
use tempfile::{tempdir, TempDir};

use crate::{Inventory, InventoryConfiguration};

const HELLO_BYTES: &[u8] = b"Hello.";
const HELLO_HASH: &str =
    "2D8BD7D9BB5F85BA643F0110D50CB506A1FE439E769A22503193EA6046BB87F7";

fn new_inventory() -> Result<(TempDir, Inventory)> {
    let temp = tempdir()?;
    let inventory =
        Inventory::open_read_write(InventoryConfiguration::new(temp.path()))?;
    Ok((temp, inventory))
}

fn blob_of(data: &[u8], content_type: &str) -> Blob {
    Blob::new(
        data.len() as u64,
        content_type,
        Hash::of_bytes(HashAlgorithm::Sha2_256, data),
    )
}

fn hello_blob() -> Blob {
    blob_of(HELLO_BYTES, "text/plain")
}

fn raw_connection(base: &Path) -> Result<rusqlite::Connection> {
    Ok(rusqlite::Connection::open(base.join("sunburst.db"))?)
}

mod blob_store;

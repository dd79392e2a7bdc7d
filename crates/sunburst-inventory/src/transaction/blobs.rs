//! Blob operations on a transaction.

use std::collections::BTreeMap;
use std::io::Read;

use rusqlite::{params, OptionalExtension};
use sunburst_model::{Blob, Hash};
use tracing::debug;

use super::{blob_from_row, Transaction};
use crate::error::InventoryError;

impl Transaction {
    pub(super) fn blob_add_inner(
        &mut self,
        blob: &Blob,
        stream: &mut dyn Read,
    ) -> Result<(), InventoryError> {
        if self.blob_store.write(blob, stream)? {
            self.written_blobs.push(blob.hash.clone());
        }
        self.connection.execute(
            "INSERT INTO blobs (hash_algorithm, hash, size, content_type) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (hash_algorithm, hash) DO NOTHING",
            params![
                blob.hash.algorithm().as_str(),
                blob.hash.value_hex(),
                blob.size as i64,
                blob.content_type
            ],
        )?;
        Ok(())
    }

    pub(super) fn blob_remove_inner(
        &mut self,
        blob: &Blob,
    ) -> Result<(), InventoryError> {
        let result = self.connection.execute(
            "DELETE FROM blobs WHERE hash_algorithm = ?1 AND hash = ?2",
            params![blob.hash.algorithm().as_str(), blob.hash.value_hex()],
        );
        if let Err(error) = result {
            if is_foreign_key_violation(&error) {
                return Err(InventoryError::BlobReferenced(blob.hash.clone()));
            }
            return Err(error.into());
        }

        self.blob_store.delete(&blob.hash)?;
        debug!(hash = %blob.hash, "blob removed");
        Ok(())
    }

    pub(super) fn blob_get_query(
        &self,
        hash: &Hash,
    ) -> Result<Option<Blob>, InventoryError> {
        Ok(self
            .connection
            .query_row(
                "SELECT hash_algorithm, hash, size, content_type \
                 FROM blobs WHERE hash_algorithm = ?1 AND hash = ?2",
                params![hash.algorithm().as_str(), hash.value_hex()],
                blob_from_row,
            )
            .optional()?)
    }

    pub(super) fn blob_list_query(
        &self,
    ) -> Result<BTreeMap<Hash, Blob>, InventoryError> {
        self.collect_blobs(
            "SELECT hash_algorithm, hash, size, content_type \
             FROM blobs ORDER BY id",
        )
    }

    pub(super) fn blobs_unreferenced_query(
        &self,
    ) -> Result<BTreeMap<Hash, Blob>, InventoryError> {
        self.collect_blobs(
            "SELECT hash_algorithm, hash, size, content_type \
             FROM blobs \
             WHERE id NOT IN (SELECT blob_id FROM package_blobs) \
             ORDER BY id",
        )
    }

    fn collect_blobs(
        &self,
        query: &str,
    ) -> Result<BTreeMap<Hash, Blob>, InventoryError> {
        let mut statement = self.connection.prepare(query)?;
        let rows = statement.query_map([], blob_from_row)?;
        let mut blobs = BTreeMap::new();
        for blob in rows {
            let blob = blob?;
            blobs.insert(blob.hash.clone(), blob);
        }
        Ok(blobs)
    }
}

fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

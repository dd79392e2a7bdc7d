//! Package operations on a transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use rusqlite::{params, OptionalExtension};
use sunburst_model::{
    Hash, Package, PackageEntry, PackageIdentifier, VirtualPath,
};
use time::OffsetDateTime;
use tracing::debug;

use super::{
    blob_from_row, conversion_error, format_time, hash_from_columns,
    identifier_from_row, version_fields, Transaction,
};
use crate::error::InventoryError;

impl Transaction {
    pub(super) fn packages_query(
        &self,
    ) -> Result<BTreeSet<PackageIdentifier>, InventoryError> {
        let mut statement = self.connection.prepare(
            "SELECT name, version_major, version_minor, version_patch, \
                    version_qualifier \
             FROM packages ORDER BY id",
        )?;
        let rows = statement.query_map([], identifier_from_row)?;
        let mut identifiers = BTreeSet::new();
        for identifier in rows {
            identifiers.insert(identifier?);
        }
        Ok(identifiers)
    }

    pub(super) fn packages_updated_since_query(
        &self,
        time: OffsetDateTime,
    ) -> Result<BTreeSet<PackageIdentifier>, InventoryError> {
        let since = format_time(time)?;
        let mut statement = self.connection.prepare(
            "SELECT name, version_major, version_minor, version_patch, \
                    version_qualifier \
             FROM packages WHERE updated > ?1 ORDER BY id",
        )?;
        let rows = statement.query_map(params![since], identifier_from_row)?;
        let mut identifiers = BTreeSet::new();
        for identifier in rows {
            identifiers.insert(identifier?);
        }
        Ok(identifiers)
    }

    pub(super) fn package_get_query(
        &self,
        identifier: &PackageIdentifier,
    ) -> Result<Option<Package>, InventoryError> {
        let Some(package_id) = self.package_id_of(identifier)? else {
            return Ok(None);
        };

        let mut entries_statement = self.connection.prepare(
            "SELECT b.hash_algorithm, b.hash, b.size, b.content_type, pb.path \
             FROM blobs b \
             JOIN package_blobs pb ON pb.blob_id = b.id \
             WHERE pb.package_id = ?1 ORDER BY b.id",
        )?;
        let rows = entries_statement.query_map(params![package_id], |row| {
            let blob = blob_from_row(row)?;
            let path: String = row.get(4)?;
            let path: VirtualPath =
                path.parse().map_err(|e| conversion_error(4, e))?;
            Ok(PackageEntry { path, blob })
        })?;
        let mut entries = BTreeMap::new();
        for entry in rows {
            let entry = entry?;
            entries.insert(entry.path.clone(), entry);
        }

        let mut meta_statement = self.connection.prepare(
            "SELECT meta_key, meta_value FROM package_meta \
             WHERE package_id = ?1 ORDER BY meta_key",
        )?;
        let rows = meta_statement.query_map(params![package_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut metadata = BTreeMap::new();
        for pair in rows {
            let (key, value) = pair?;
            metadata.insert(key, value);
        }

        Ok(Some(Package {
            identifier: identifier.clone(),
            metadata,
            entries,
        }))
    }

    pub(super) fn blob_file_query(
        &self,
        identifier: &PackageIdentifier,
        path: &VirtualPath,
    ) -> Result<PathBuf, InventoryError> {
        let (major, minor, patch, qualifier) =
            version_fields(&identifier.version);
        let hash = self
            .connection
            .query_row(
                "SELECT b.hash_algorithm, b.hash \
                 FROM blobs b \
                 JOIN package_blobs pb ON pb.blob_id = b.id \
                 JOIN packages p ON p.id = pb.package_id \
                 WHERE p.name = ?1 AND p.version_major = ?2 \
                   AND p.version_minor = ?3 AND p.version_patch = ?4 \
                   AND p.version_qualifier = ?5 AND pb.path = ?6",
                params![
                    identifier.name.as_str(),
                    major,
                    minor,
                    patch,
                    qualifier,
                    path.to_string()
                ],
                |row| {
                    let algorithm: String = row.get(0)?;
                    let value: String = row.get(1)?;
                    hash_from_columns(&algorithm, &value)
                },
            )
            .optional()?;

        match hash {
            Some(hash) => Ok(self.blob_store.path_of(&hash)),
            None => Err(InventoryError::PathNonexistent {
                identifier: identifier.clone(),
                path: path.clone(),
            }),
        }
    }

    pub(super) fn package_put_inner(
        &mut self,
        package: &Package,
    ) -> Result<(), InventoryError> {
        let identifier = &package.identifier;
        let blob_ids = self.blob_ids_for(package)?;
        let now = format_time(OffsetDateTime::now_utc())?;

        match self.package_id_of(identifier)? {
            Some(package_id) => {
                if !identifier.version.is_snapshot() {
                    return Err(InventoryError::PackageDuplicate(
                        identifier.clone(),
                    ));
                }
                debug!(package = %identifier, "replacing snapshot package");
                self.connection.execute(
                    "UPDATE packages SET updated = ?1 WHERE id = ?2",
                    params![now, package_id],
                )?;
                self.connection.execute(
                    "DELETE FROM package_blobs WHERE package_id = ?1",
                    params![package_id],
                )?;
                self.connection.execute(
                    "DELETE FROM package_meta WHERE package_id = ?1",
                    params![package_id],
                )?;
                self.insert_package_rows(package_id, package, &blob_ids)?;
            }
            None => {
                let (major, minor, patch, qualifier) =
                    version_fields(&identifier.version);
                self.connection.execute(
                    "INSERT INTO packages (name, version_major, \
                     version_minor, version_patch, version_qualifier, \
                     updated) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        identifier.name.as_str(),
                        major,
                        minor,
                        patch,
                        qualifier,
                        now
                    ],
                )?;
                let package_id = self.connection.last_insert_rowid();
                debug!(package = %identifier, "installed package");
                self.insert_package_rows(package_id, package, &blob_ids)?;
            }
        }
        Ok(())
    }

    pub(super) fn package_id_of(
        &self,
        identifier: &PackageIdentifier,
    ) -> Result<Option<i64>, InventoryError> {
        let (major, minor, patch, qualifier) =
            version_fields(&identifier.version);
        Ok(self
            .connection
            .query_row(
                "SELECT id FROM packages \
                 WHERE name = ?1 AND version_major = ?2 \
                   AND version_minor = ?3 AND version_patch = ?4 \
                   AND version_qualifier = ?5",
                params![
                    identifier.name.as_str(),
                    major,
                    minor,
                    patch,
                    qualifier
                ],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn blob_ids_for(
        &self,
        package: &Package,
    ) -> Result<BTreeMap<Hash, i64>, InventoryError> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM blobs WHERE hash_algorithm = ?1 AND hash = ?2",
        )?;
        let mut ids = BTreeMap::new();
        let mut missing = Vec::new();
        for entry in package.entries.values() {
            let hash = &entry.blob.hash;
            let id: Option<i64> = statement
                .query_row(
                    params![hash.algorithm().as_str(), hash.value_hex()],
                    |row| row.get(0),
                )
                .optional()?;
            match id {
                Some(id) => {
                    ids.insert(hash.clone(), id);
                }
                None => missing.push(hash.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(ids)
        } else {
            missing.sort();
            missing.dedup();
            Err(InventoryError::PackageMissingBlobs {
                identifier: package.identifier.clone(),
                missing,
            })
        }
    }

    fn insert_package_rows(
        &self,
        package_id: i64,
        package: &Package,
        blob_ids: &BTreeMap<Hash, i64>,
    ) -> Result<(), InventoryError> {
        let mut entry_statement = self.connection.prepare(
            "INSERT INTO package_blobs (package_id, blob_id, path) \
             VALUES (?1, ?2, ?3)",
        )?;
        for entry in package.entries.values() {
            let Some(blob_id) = blob_ids.get(&entry.blob.hash) else {
                return Err(InventoryError::PackageMissingBlobs {
                    identifier: package.identifier.clone(),
                    missing: vec![entry.blob.hash.to_string()],
                });
            };
            entry_statement.execute(params![
                package_id,
                blob_id,
                entry.path.to_string()
            ])?;
        }

        let mut meta_statement = self.connection.prepare(
            "INSERT INTO package_meta (package_id, meta_key, meta_value) \
             VALUES (?1, ?2, ?3)",
        )?;
        for (key, value) in &package.metadata {
            meta_statement.execute(params![package_id, key, value])?;
        }
        Ok(())
    }
}

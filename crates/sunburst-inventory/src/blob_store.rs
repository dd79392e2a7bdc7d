//! Content-addressed blob storage.
//!
//! Blobs live under `<base>/blob/<ALGO>/<XX>/<REST>` where `<XX>` is the
//! first two upper-hex digits of the hash and `<REST>` the remainder.
//! Committed content carries the suffix `.b`, in-progress uploads `.t`,
//! and advisory lock files `.l`. A `.b` file is immutable once it exists,
//! so reads take no lock; writers of the same hash serialize on the `.l`
//! file across threads and processes.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs4::FileExt;
use sha2::{Digest, Sha256};
use sunburst_model::{Blob, Hash, HashAlgorithm};
use tracing::{debug, trace};

use crate::error::InventoryError;

const BLOB_DIR: &str = "blob";
const EXT_BLOB: &str = "b";
const EXT_TEMP: &str = "t";
const EXT_LOCK: &str = "l";

/// A content-addressed blob store rooted at `<base>/blob`.
#[derive(Clone, Debug)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub(crate) fn open(base: &Path) -> Self {
        Self {
            root: base.join(BLOB_DIR),
        }
    }

    /// The committed on-disk path for a hash. Pure; the file may or may
    /// not exist.
    #[must_use]
    pub fn path_of(&self, hash: &Hash) -> PathBuf {
        self.file_path(hash, EXT_BLOB)
    }

    fn file_path(&self, hash: &Hash, extension: &str) -> PathBuf {
        let name = hash.value_hex();
        let (shard, rest) = name.split_at(2);
        self.root
            .join(hash.algorithm().as_str())
            .join(shard)
            .join(format!("{rest}.{extension}"))
    }

    /// Stream a blob into the store, verifying the received bytes against
    /// the declared hash and size. Returns `true` if a new `.b` file was
    /// created, `false` if one already existed for this hash.
    ///
    /// The upload goes through a `.t` file that is removed on every exit
    /// path; the committed `.b` file appears only via an atomic rename
    /// after verification, so a failed upload never leaves partial
    /// content behind.
    pub fn write(
        &self,
        blob: &Blob,
        stream: &mut dyn Read,
    ) -> Result<bool, InventoryError> {
        let path_blob = self.file_path(&blob.hash, EXT_BLOB);
        let path_tmp = self.file_path(&blob.hash, EXT_TEMP);
        let path_lock = self.file_path(&blob.hash, EXT_LOCK);

        if let Some(parent) = path_blob.parent() {
            fs::create_dir_all(parent)?;
        }

        let _lock = acquire_lock(&path_lock)?;
        let existed = path_blob.exists();
        let result = write_locked(blob, stream, &path_blob, &path_tmp);
        remove_if_present(&path_tmp);
        match result {
            Ok(()) => {
                debug!(hash = %blob.hash, size = blob.size, "blob written");
                Ok(!existed)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the committed file for a hash, under its lock. Deleting an
    /// absent blob is not an error.
    pub fn delete(&self, hash: &Hash) -> Result<(), InventoryError> {
        let path_blob = self.file_path(hash, EXT_BLOB);
        let path_lock = self.file_path(hash, EXT_LOCK);

        if let Some(parent) = path_blob.parent() {
            fs::create_dir_all(parent)?;
        }

        let _lock = acquire_lock(&path_lock)?;
        match fs::remove_file(&path_blob) {
            Ok(()) => {
                trace!(hash = %hash, "blob file deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_locked(
    blob: &Blob,
    stream: &mut dyn Read,
    path_blob: &Path,
    path_tmp: &Path,
) -> Result<(), InventoryError> {
    let received = match blob.hash.algorithm() {
        HashAlgorithm::Sha2_256 => {
            let mut file = File::create(path_tmp)?;
            let mut digest = Sha256::new();
            let mut buf = [0u8; 32 * 1024];
            let mut size: u64 = 0;
            loop {
                let read = stream.read(&mut buf)?;
                if read == 0 {
                    break;
                }
                digest.update(&buf[..read]);
                file.write_all(&buf[..read])?;
                size += read as u64;
            }
            file.sync_all()?;
            (digest.finalize().to_vec(), size)
        }
    };

    let (received_hash, received_size) = received;
    if received_hash != blob.hash.value() {
        return Err(InventoryError::HashMismatch {
            expected: blob.hash.value_hex(),
            received: hex::encode_upper(received_hash),
        });
    }
    if received_size != blob.size {
        return Err(InventoryError::SizeMismatch {
            expected: blob.size,
            received: received_size,
        });
    }

    fs::rename(path_tmp, path_blob)?;
    Ok(())
}

// The lock file is left in place; holding the open handle holds the OS
// advisory lock, and dropping it releases the lock.
fn acquire_lock(path: &Path) -> Result<File, InventoryError> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}

fn remove_if_present(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to remove transient upload file"
            );
        }
    }
}

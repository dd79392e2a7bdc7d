use std::io;

use sunburst_model::error_codes::{self, ErrorCode};
use sunburst_model::{Hash, PackageIdentifier, VirtualPath};
use thiserror::Error;

/// Errors surfaced by the inventory.
///
/// Every variant maps to one of the stable error codes via [`code`].
///
/// [`code`]: InventoryError::code
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{} error(s) occurred while closing the transaction", .0.len())]
    Closing(Vec<InventoryError>),

    #[error("hash mismatch: expected {expected}, received {received}")]
    HashMismatch { expected: String, received: String },

    #[error("blob size mismatch: expected {expected} bytes, received {received}")]
    SizeMismatch { expected: u64, received: u64 },

    #[error(
        "package {identifier} refers to blobs that are not in the catalog: {}",
        .missing.join(", ")
    )]
    PackageMissingBlobs {
        identifier: PackageIdentifier,
        missing: Vec<String>,
    },

    #[error("package {0} is already installed and is not a snapshot version")]
    PackageDuplicate(PackageIdentifier),

    #[error("blob {0} is still referenced by one or more package entries")]
    BlobReferenced(Hash),

    #[error("package {identifier} has no entry at path {path}")]
    PathNonexistent {
        identifier: PackageIdentifier,
        path: VirtualPath,
    },

    #[error("the transaction has already been completed")]
    InvalidState,

    #[error(
        "database schema version {found} is newer than the supported \
         version {supported}"
    )]
    SchemaTooNew { found: u64, supported: u64 },

    #[error(
        "database schema version {found} is older than the supported \
         version {supported}, and the inventory is open read-only"
    )]
    SchemaTooOld { found: u64, supported: u64 },
}

impl InventoryError {
    /// The stable error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => error_codes::ERROR_IO,
            Self::Closing(_) => error_codes::ERROR_CLOSING,
            Self::Database(_)
            | Self::SchemaTooNew { .. }
            | Self::SchemaTooOld { .. } => error_codes::ERROR_DATABASE,
            Self::HashMismatch { .. } | Self::SizeMismatch { .. } => {
                error_codes::ERROR_HASH_MISMATCH
            }
            Self::PackageMissingBlobs { .. } => {
                error_codes::ERROR_PACKAGE_MISSING_BLOBS
            }
            Self::PackageDuplicate(_) => error_codes::ERROR_PACKAGE_DUPLICATE,
            Self::BlobReferenced(_) => error_codes::ERROR_BLOB_REFERENCED,
            Self::PathNonexistent { .. } => error_codes::ERROR_PATH_NONEXISTENT,
            Self::InvalidState => error_codes::ERROR_INVALID_STATE,
        }
    }
}

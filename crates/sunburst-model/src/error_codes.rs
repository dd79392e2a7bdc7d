//! Stable error code identifiers.
//!
//! Codes are part of the public contract: external tooling matches on the
//! textual identifier, so existing codes must never be renamed.

use std::fmt;

/// A stable, machine-readable error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An I/O error occurred.
pub const ERROR_IO: ErrorCode = ErrorCode("error-io");

/// One or more errors occurred while closing resources.
pub const ERROR_CLOSING: ErrorCode = ErrorCode("error-closing");

/// There was a database error.
pub const ERROR_DATABASE: ErrorCode = ErrorCode("error-db");

/// A hash value did not match the expected value.
pub const ERROR_HASH_MISMATCH: ErrorCode = ErrorCode("error-hash-mismatch");

/// A package refers to blobs that are not in the catalog.
pub const ERROR_PACKAGE_MISSING_BLOBS: ErrorCode =
    ErrorCode("error-package-missing-blobs");

/// A non-snapshot package with the same identifier is already installed.
pub const ERROR_PACKAGE_DUPLICATE: ErrorCode =
    ErrorCode("error-package-duplicate");

/// A blob cannot be removed while package entries reference it.
pub const ERROR_BLOB_REFERENCED: ErrorCode = ErrorCode("error-blob-referenced");

/// A package has no entry at the requested path.
pub const ERROR_PATH_NONEXISTENT: ErrorCode =
    ErrorCode("error-path-nonexistent");

/// No peer is registered for the requesting package.
pub const ERROR_PEER_MISSING: ErrorCode = ErrorCode("error-peer-missing");

/// The requesting peer does not import the target package.
pub const ERROR_PEER_IMPORT_MISSING: ErrorCode =
    ErrorCode("error-peer-import-missing");

/// A peer declaration is not well-formed.
pub const ERROR_PEER_MISCONFIGURED: ErrorCode =
    ErrorCode("error-peer-misconfigured");

/// An operation was attempted on a completed transaction.
pub const ERROR_INVALID_STATE: ErrorCode = ErrorCode("error-invalid-state");

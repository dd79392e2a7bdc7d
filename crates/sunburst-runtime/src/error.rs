use std::io;

use sunburst_inventory::InventoryError;
use sunburst_model::error_codes::{self, ErrorCode};
use thiserror::Error;

/// Errors surfaced by runtime file resolution.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no peer is registered for package '{requester}'")]
    PeerMissing { requester: String },

    #[error("peer '{requester}' does not import package '{target}'")]
    PeerImportMissing { requester: String, target: String },

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl RuntimeError {
    /// The stable error code for this error. Inventory errors keep their
    /// original code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PeerMissing { .. } => error_codes::ERROR_PEER_MISSING,
            Self::PeerImportMissing { .. } => {
                error_codes::ERROR_PEER_IMPORT_MISSING
            }
            Self::Inventory(e) => e.code(),
            Self::Io(_) => error_codes::ERROR_IO,
        }
    }
}

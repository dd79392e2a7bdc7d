#![deny(clippy::all, warnings)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Core value types for the Sunburst asset inventory: package names and
//! versions, virtual paths, hashes, blobs, packages, and peers.
//!
//! Every type here validates on construction and is immutable afterwards.
//! The textual forms round-trip: `parse(print(x)) == x` for every value.

mod blob;
mod error;
pub mod error_codes;
mod hash;
mod package;
mod package_name;
mod path;
mod peer;
mod version;

pub use blob::Blob;
pub use error::ModelError;
pub use hash::{Hash, HashAlgorithm};
pub use package::{Package, PackageEntry, PackageIdentifier};
pub use package_name::PackageName;
pub use path::VirtualPath;
pub use peer::{Peer, PeerBuilder, PeerMisconfigured};
pub use version::{Version, VersionQualifier};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::blob::Blob;
use crate::error::ModelError;
use crate::package_name::PackageName;
use crate::path::VirtualPath;
use crate::version::Version;

/// A package name plus a version, uniquely identifying a package.
///
/// The textual form is `NAME:VERSION`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageIdentifier {
    pub name: PackageName,
    pub version: Version,
}

impl PackageIdentifier {
    #[must_use]
    pub fn new(name: PackageName, version: Version) -> Self {
        Self { name, version }
    }
}

impl FromStr for PackageIdentifier {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (name, version) = text
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidIdentifier(text.to_string()))?;
        Ok(Self {
            name: name.parse()?,
            version: version.parse()?,
        })
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// A single file inside a package: a path bound to a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageEntry {
    pub path: VirtualPath,
    pub blob: Blob,
}

/// A named, versioned bundle of entries with metadata.
///
/// Entries are keyed by path, so a path is unique within a package by
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    pub identifier: PackageIdentifier,
    pub metadata: BTreeMap<String, String>,
    pub entries: BTreeMap<VirtualPath, PackageEntry>,
}

impl Package {
    #[must_use]
    pub fn new(identifier: PackageIdentifier) -> Self {
        Self {
            identifier,
            metadata: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the entry at the entry's path.
    pub fn insert_entry(&mut self, entry: PackageEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::error_codes::{ErrorCode, ERROR_PEER_MISCONFIGURED};
use crate::package::PackageIdentifier;
use crate::package_name::PackageName;
use crate::version::Version;

/// A peer: a software component that declares imports over package names
/// and versions. At most one version per imported package name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    package_name: String,
    imports: BTreeMap<PackageName, Version>,
}

impl Peer {
    /// Start building a peer for the given code package name.
    #[must_use]
    pub fn builder(package_name: impl Into<String>) -> PeerBuilder {
        PeerBuilder {
            package_name: package_name.into(),
            imports: BTreeMap::new(),
            problems: Vec::new(),
        }
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    #[must_use]
    pub fn imports(&self) -> &BTreeMap<PackageName, Version> {
        &self.imports
    }

    /// The imports as a set of package identifiers.
    #[must_use]
    pub fn import_set(&self) -> BTreeSet<PackageIdentifier> {
        self.imports
            .iter()
            .map(|(name, version)| {
                PackageIdentifier::new(name.clone(), version.clone())
            })
            .collect()
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[peer {}]", self.package_name)
    }
}

/// The error raised when a peer declaration is not well-formed.
#[derive(Debug, Error)]
#[error("peer '{package_name}' is misconfigured: {}", .problems.join("; "))]
pub struct PeerMisconfigured {
    pub package_name: String,
    pub problems: Vec<String>,
}

impl PeerMisconfigured {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        ERROR_PEER_MISCONFIGURED
    }
}

/// A mutable peer builder. Problems accumulate; `build` fails if any were
/// recorded.
#[derive(Debug)]
pub struct PeerBuilder {
    package_name: String,
    imports: BTreeMap<PackageName, Version>,
    problems: Vec<String>,
}

impl PeerBuilder {
    /// Add an import. A second import of the same package name is recorded
    /// as a problem.
    #[must_use]
    pub fn add_import(mut self, identifier: PackageIdentifier) -> Self {
        match self.imports.get(&identifier.name) {
            Some(existing) => {
                self.problems.push(format!(
                    "package '{}' is imported with version {} and again with \
                     version {}",
                    identifier.name, existing, identifier.version
                ));
            }
            None => {
                self.imports.insert(identifier.name, identifier.version);
            }
        }
        self
    }

    /// Parse and add an import; a parse failure is recorded as a problem.
    #[must_use]
    pub fn add_import_text(mut self, text: &str) -> Self {
        match text.parse::<PackageIdentifier>() {
            Ok(identifier) => self.add_import(identifier),
            Err(e) => {
                self.problems.push(e.to_string());
                self
            }
        }
    }

    pub fn build(mut self) -> Result<Peer, PeerMisconfigured> {
        if let Err(e) = PackageName::new(self.package_name.clone()) {
            self.problems.push(e.to_string());
        }
        if !self.problems.is_empty() {
            return Err(PeerMisconfigured {
                package_name: self.package_name,
                problems: self.problems,
            });
        }
        Ok(Peer {
            package_name: self.package_name,
            imports: self.imports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_well_formed_peer() {
        let peer = Peer::builder("com.io7m.sunburst.tests")
            .add_import_text("a.b.c:1.0.0")
            .add_import_text("x.y:2.0.0-SNAPSHOT")
            .build()
            .unwrap();

        assert_eq!(peer.package_name(), "com.io7m.sunburst.tests");
        assert_eq!(peer.imports().len(), 2);
        assert_eq!(peer.import_set().len(), 2);
    }

    #[test]
    fn duplicate_imports_are_rejected() {
        let err = Peer::builder("com.io7m.sunburst.tests")
            .add_import_text("a.b.c:1.0.0")
            .add_import_text("a.b.c:2.0.0")
            .build()
            .unwrap_err();

        assert_eq!(err.code().as_str(), "error-peer-misconfigured");
        assert_eq!(err.problems.len(), 1);
    }

    #[test]
    fn unparseable_imports_are_recorded() {
        let err = Peer::builder("com.io7m.sunburst.tests")
            .add_import_text("definitely not an identifier")
            .build()
            .unwrap_err();
        assert_eq!(err.problems.len(), 1);
    }

    #[test]
    fn invalid_package_name_is_rejected() {
        let err = Peer::builder("Not A Package").build().unwrap_err();
        assert_eq!(err.code().as_str(), "error-peer-misconfigured");
    }
}

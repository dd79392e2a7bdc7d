use std::fmt;

use sunburst_inventory::InventoryError;
use sunburst_model::PackageIdentifier;

/// A problem recorded while loading peers. Problems never abort the load;
/// they mark the context as failed.
#[derive(Debug)]
pub enum RuntimeProblem {
    /// A factory supplier or the factory itself raised an error.
    BrokenPeerFactory { error: anyhow::Error },

    /// Two loaded peers claimed the same package name; the later one was
    /// discarded.
    ConflictingPeer { package_name: String },

    /// A peer import names a package identifier absent from the catalog.
    UnsatisfiedRequirement {
        peer: String,
        requires: PackageIdentifier,
    },

    /// The catalog could not be consulted.
    Inventory(InventoryError),
}

impl fmt::Display for RuntimeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenPeerFactory { error } => {
                write!(f, "a peer factory failed to open: {error}")
            }
            Self::ConflictingPeer { package_name } => {
                write!(
                    f,
                    "a peer for package '{package_name}' is already loaded"
                )
            }
            Self::UnsatisfiedRequirement { peer, requires } => {
                write!(
                    f,
                    "peer '{peer}' requires package {requires}, which is not \
                     installed"
                )
            }
            Self::Inventory(error) => {
                write!(f, "inventory error: {error}")
            }
        }
    }
}

/// The status of a runtime context after its most recent load.
#[derive(Debug, Default)]
pub struct RuntimeStatus {
    problems: Vec<RuntimeProblem>,
}

impl RuntimeStatus {
    pub(crate) fn new(problems: Vec<RuntimeProblem>) -> Self {
        Self { problems }
    }

    #[must_use]
    pub fn problems(&self) -> &[RuntimeProblem] {
        &self.problems
    }

    /// `true` if the most recent load recorded no problems.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.problems.is_empty()
    }
}

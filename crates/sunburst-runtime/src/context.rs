//! The runtime context: loaded peers plus their validated imports.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use sunburst_inventory::{InventoryReadable, TransactionReadable};
use sunburst_model::{PackageIdentifier, Peer, VirtualPath};
use tracing::{debug, warn};

use crate::error::RuntimeError;
use crate::problems::{RuntimeProblem, RuntimeStatus};
use crate::service_loader::{PeerFactorySupplier, ServiceLoader};

/// The default runtime context.
///
/// Requesters are identified by their fully-qualified code package name;
/// callers typically derive it from `module_path!()` or their host
/// module system's equivalent.
pub struct RuntimeContext {
    inventory: Box<dyn InventoryReadable>,
    loader: Box<dyn ServiceLoader>,
    peers: BTreeMap<String, Peer>,
    status: RuntimeStatus,
}

impl RuntimeContext {
    /// Open a context over the given inventory, loading peers immediately.
    /// Loading problems never fail the open; inspect [`status`].
    ///
    /// [`status`]: RuntimeContext::status
    #[must_use]
    pub fn open(
        inventory: Box<dyn InventoryReadable>,
        loader: Box<dyn ServiceLoader>,
    ) -> Self {
        let mut context = Self {
            inventory,
            loader,
            peers: BTreeMap::new(),
            status: RuntimeStatus::default(),
        };
        context.reload();
        context
    }

    /// Discard all loaded peers and load them again.
    pub fn reload(&mut self) {
        let mut problems = Vec::new();
        let mut peers: BTreeMap<String, Peer> = BTreeMap::new();

        match self.inventory.open_transaction_readable() {
            Ok(transaction) => {
                for supplier in self.loader.load_peer_factories() {
                    let loaded = load_peer(
                        &mut problems,
                        &peers,
                        transaction.as_ref(),
                        &supplier,
                    );
                    if let Some(peer) = loaded {
                        peers.insert(peer.package_name().to_string(), peer);
                    }
                }
            }
            Err(e) => problems.push(RuntimeProblem::Inventory(e)),
        }

        debug!(
            peers = peers.len(),
            problems = problems.len(),
            "peers loaded"
        );
        self.peers = peers;
        self.status = RuntimeStatus::new(problems);
    }

    /// The status of the most recent load.
    #[must_use]
    pub fn status(&self) -> &RuntimeStatus {
        &self.status
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status.is_successful()
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        !self.is_successful()
    }

    /// Resolve a file of an imported package to its on-disk path.
    ///
    /// The requester must be a loaded peer, and must import
    /// `target_package`; the version used is the one the peer declares.
    pub fn find_file(
        &self,
        requester: &str,
        target_package: &str,
        path: &VirtualPath,
    ) -> Result<PathBuf, RuntimeError> {
        let peer = self.peers.get(requester).ok_or_else(|| {
            RuntimeError::PeerMissing {
                requester: requester.to_string(),
            }
        })?;

        let import = peer
            .imports()
            .iter()
            .find(|(name, _)| name.as_str() == target_package);
        let Some((name, version)) = import else {
            return Err(RuntimeError::PeerImportMissing {
                requester: requester.to_string(),
                target: target_package.to_string(),
            });
        };

        let identifier =
            PackageIdentifier::new(name.clone(), version.clone());
        let transaction = self.inventory.open_transaction_readable()?;
        Ok(transaction.blob_file(&identifier, path)?)
    }

    /// As [`find_file`], with the path parsed from text.
    ///
    /// [`find_file`]: RuntimeContext::find_file
    pub fn find_file_text(
        &self,
        requester: &str,
        target_package: &str,
        path: &str,
    ) -> Result<PathBuf, RuntimeError> {
        let path: VirtualPath = path
            .parse()
            .map_err(|e| RuntimeError::Io(invalid_path_error(e)))?;
        self.find_file(requester, target_package, &path)
    }

    /// Resolve a file and open it for reading.
    pub fn open_file(
        &self,
        requester: &str,
        target_package: &str,
        path: &VirtualPath,
    ) -> Result<File, RuntimeError> {
        let resolved = self.find_file(requester, target_package, path)?;
        Ok(File::open(resolved)?)
    }
}

fn invalid_path_error(error: sunburst_model::ModelError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, error)
}

fn load_peer(
    problems: &mut Vec<RuntimeProblem>,
    peers: &BTreeMap<String, Peer>,
    transaction: &dyn TransactionReadable,
    supplier: &PeerFactorySupplier,
) -> Option<Peer> {
    let factory = match supplier() {
        Ok(factory) => factory,
        Err(error) => {
            warn!(error = %error, "peer factory supplier failed");
            problems.push(RuntimeProblem::BrokenPeerFactory { error });
            return None;
        }
    };

    let peer = match factory.open_peer() {
        Ok(peer) => peer,
        Err(error) => {
            warn!(error = %error, "peer factory failed to open its peer");
            problems.push(RuntimeProblem::BrokenPeerFactory { error });
            return None;
        }
    };

    if peers.contains_key(peer.package_name()) {
        warn!(package = peer.package_name(), "conflicting peer discarded");
        problems.push(RuntimeProblem::ConflictingPeer {
            package_name: peer.package_name().to_string(),
        });
        return None;
    }

    let mut failed = false;
    for (name, version) in peer.imports() {
        let identifier =
            PackageIdentifier::new(name.clone(), version.clone());
        match transaction.package_get(&identifier) {
            Ok(Some(_)) => {}
            Ok(None) => {
                failed = true;
                problems.push(RuntimeProblem::UnsatisfiedRequirement {
                    peer: peer.package_name().to_string(),
                    requires: identifier,
                });
            }
            Err(e) => {
                failed = true;
                problems.push(RuntimeProblem::Inventory(e));
            }
        }
    }

    if failed {
        return None;
    }
    Some(peer)
}

//! Runtime context tests.

use std::sync::Arc;

use anyhow::Result;
use sunburst_inventory::{
    Inventory, InventoryConfiguration, TransactionWritable,
};
use sunburst_model::{
    Blob, Hash, HashAlgorithm, Package, PackageEntry, Peer,
};
use tempfile::{tempdir, TempDir};

use crate::{
    PeerFactory, PeerFactorySupplier, RuntimeContext, RuntimeProblem,
    ServiceLoader, StaticServiceLoader,
};

const DATA: &[u8] = b"Hello.";
const REQUESTER: &str = "com.io7m.sunburst.tests";

struct StaticPeerFactory {
    peer: Peer,
}

impl PeerFactory for StaticPeerFactory {
    fn open_peer(&self) -> anyhow::Result<Peer> {
        Ok(self.peer.clone())
    }
}

struct CrashingPeerFactory;

impl PeerFactory for CrashingPeerFactory {
    fn open_peer(&self) -> anyhow::Result<Peer> {
        anyhow::bail!("peer manifest unreadable")
    }
}

struct CrashingSupplierLoader;

impl ServiceLoader for CrashingSupplierLoader {
    fn load_peer_factories(&self) -> Vec<PeerFactorySupplier> {
        let supplier: PeerFactorySupplier =
            Box::new(|| anyhow::bail!("provider instantiation failed"));
        vec![supplier]
    }
}

fn peer_factory(package_name: &str, import: &str) -> Arc<dyn PeerFactory> {
    let peer = Peer::builder(package_name)
        .add_import_text(import)
        .build()
        .expect("well-formed peer");
    Arc::new(StaticPeerFactory { peer })
}

fn populated_inventory() -> Result<(TempDir, Inventory)> {
    let temp = tempdir()?;
    let inventory =
        Inventory::open_read_write(InventoryConfiguration::new(temp.path()))?;

    let blob = Blob::new(
        DATA.len() as u64,
        "application/octet-stream",
        Hash::of_bytes(HashAlgorithm::Sha2_256, DATA),
    );
    let mut package = Package::new("a.b.c:1.0.0".parse()?);
    package.insert_entry(PackageEntry {
        path: "/x".parse()?,
        blob: blob.clone(),
    });

    let mut transaction = inventory.open_transaction()?;
    transaction.blob_add(&blob, &mut &DATA[..])?;
    transaction.package_put(&package)?;
    transaction.commit()?;
    Ok((temp, inventory))
}

fn context_with(
    loader: impl ServiceLoader + 'static,
) -> Result<(TempDir, RuntimeContext)> {
    let (temp, inventory) = populated_inventory()?;
    inventory.close();
    let read_only =
        Inventory::open_read_only(InventoryConfiguration::new(temp.path()))?;
    let context =
        RuntimeContext::open(Box::new(read_only), Box::new(loader));
    Ok((temp, context))
}

#[test]
fn resolves_imported_files() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, context) = context_with(loader)?;
    assert!(context.is_successful());
    assert!(!context.is_failed());

    let path = context.find_file(REQUESTER, "a.b.c", &"/x".parse()?)?;
    let bytes = std::fs::read(path)?;
    assert_eq!(
        Hash::of_bytes(HashAlgorithm::Sha2_256, &bytes),
        Hash::of_bytes(HashAlgorithm::Sha2_256, DATA)
    );
    Ok(())
}

#[test]
fn open_file_reads_the_resolved_blob() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, context) = context_with(loader)?;

    use std::io::Read;
    let mut file = context.open_file(REQUESTER, "a.b.c", &"/x".parse()?)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    assert_eq!(bytes, DATA);
    Ok(())
}

#[test]
fn unknown_requesters_are_rejected() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, context) = context_with(loader)?;

    let err = context
        .find_file("not.imported", "a.b.c", &"/x".parse()?)
        .unwrap_err();
    assert_eq!(err.code().as_str(), "error-peer-missing");
    Ok(())
}

#[test]
fn undeclared_imports_are_rejected() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, context) = context_with(loader)?;

    let err = context
        .find_file(REQUESTER, "x.y", &"/x".parse()?)
        .unwrap_err();
    assert_eq!(err.code().as_str(), "error-peer-import-missing");
    Ok(())
}

#[test]
fn missing_paths_keep_their_inventory_code() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, context) = context_with(loader)?;

    let err = context
        .find_file_text(REQUESTER, "a.b.c", "/nope")
        .unwrap_err();
    assert_eq!(err.code().as_str(), "error-path-nonexistent");
    Ok(())
}

#[test]
fn broken_suppliers_become_problems() -> Result<()> {
    let (_temp, context) = context_with(CrashingSupplierLoader)?;
    assert!(context.is_failed());
    assert_eq!(context.status().problems().len(), 1);
    assert!(matches!(
        context.status().problems()[0],
        RuntimeProblem::BrokenPeerFactory { .. }
    ));
    Ok(())
}

#[test]
fn broken_factories_become_problems() -> Result<()> {
    let loader =
        StaticServiceLoader::new(vec![Arc::new(CrashingPeerFactory)]);
    let (_temp, context) = context_with(loader)?;
    assert!(context.is_failed());
    assert!(matches!(
        context.status().problems()[0],
        RuntimeProblem::BrokenPeerFactory { .. }
    ));
    Ok(())
}

#[test]
fn conflicting_peers_are_discarded() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![
        peer_factory(REQUESTER, "a.b.c:1.0.0"),
        peer_factory(REQUESTER, "a.b.c:1.0.0"),
    ]);
    let (_temp, context) = context_with(loader)?;

    assert!(context.is_failed());
    assert!(matches!(
        context.status().problems()[0],
        RuntimeProblem::ConflictingPeer { .. }
    ));
    // The first peer still works.
    context.find_file(REQUESTER, "a.b.c", &"/x".parse()?)?;
    Ok(())
}

#[test]
fn unsatisfied_imports_reject_the_peer() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "b.c.d:9.9.9",
    )]);
    let (_temp, context) = context_with(loader)?;

    assert!(context.is_failed());
    match &context.status().problems()[0] {
        RuntimeProblem::UnsatisfiedRequirement { peer, requires } => {
            assert_eq!(peer, REQUESTER);
            assert_eq!(requires.to_string(), "b.c.d:9.9.9");
        }
        other => panic!("unexpected problem: {other}"),
    }

    // The rejected peer is not available for resolution.
    let err = context
        .find_file(REQUESTER, "b.c.d", &"/x".parse()?)
        .unwrap_err();
    assert_eq!(err.code().as_str(), "error-peer-missing");
    Ok(())
}

#[test]
fn reload_is_idempotent() -> Result<()> {
    let loader = StaticServiceLoader::new(vec![peer_factory(
        REQUESTER,
        "a.b.c:1.0.0",
    )]);
    let (_temp, mut context) = context_with(loader)?;

    context.reload();
    context.reload();
    assert!(context.is_successful());
    context.find_file(REQUESTER, "a.b.c", &"/x".parse()?)?;
    Ok(())
}

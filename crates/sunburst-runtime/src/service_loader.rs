//! Peer factory discovery.
//!
//! The mechanism that finds peer factories at runtime is abstracted behind
//! [`ServiceLoader`], so the core never assumes a concrete discovery
//! binding. Hosts provide whatever plug-in enumeration they have;
//! [`StaticServiceLoader`] serves embedded registries and tests.

use std::sync::Arc;

use sunburst_model::Peer;

/// A factory producing one peer. Opening may fail arbitrarily; failures
/// are recorded as problems, never propagated to the caller.
pub trait PeerFactory {
    fn open_peer(&self) -> anyhow::Result<Peer>;
}

/// A deferred peer factory. The supplier itself may fail, mirroring
/// discovery mechanisms that instantiate providers lazily.
pub type PeerFactorySupplier =
    Box<dyn Fn() -> anyhow::Result<Arc<dyn PeerFactory>>>;

/// The service discovery capability: enumerate peer factory suppliers.
pub trait ServiceLoader {
    fn load_peer_factories(&self) -> Vec<PeerFactorySupplier>;
}

/// A service loader over a fixed, in-memory list of factories.
#[derive(Default)]
pub struct StaticServiceLoader {
    factories: Vec<Arc<dyn PeerFactory>>,
}

impl StaticServiceLoader {
    #[must_use]
    pub fn new(factories: Vec<Arc<dyn PeerFactory>>) -> Self {
        Self { factories }
    }
}

impl ServiceLoader for StaticServiceLoader {
    fn load_peer_factories(&self) -> Vec<PeerFactorySupplier> {
        self.factories
            .iter()
            .map(|factory| -> PeerFactorySupplier {
                let factory = Arc::clone(factory);
                Box::new(move || Ok(Arc::clone(&factory)))
            })
            .collect()
    }
}

#![deny(clippy::all, warnings)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! The Sunburst runtime: loads peer plug-ins, validates their declared
//! imports against the inventory catalog, and resolves imported files to
//! on-disk paths.
//!
//! Peer loading never fails the caller: every broken factory, conflicting
//! peer, or unsatisfied import is recorded as a [`RuntimeProblem`] in the
//! context's [`RuntimeStatus`], and the context stays usable with the
//! peers that loaded successfully.

mod context;
mod error;
mod problems;
mod service_loader;

pub use context::RuntimeContext;
pub use error::RuntimeError;
pub use problems::{RuntimeProblem, RuntimeStatus};
pub use service_loader::{
    PeerFactory, PeerFactorySupplier, ServiceLoader, StaticServiceLoader,
};

#[cfg(test)]
mod tests;

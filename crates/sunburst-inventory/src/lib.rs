#![deny(clippy::all, warnings)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! The Sunburst inventory: a content-addressed blob store bound to a
//! relational package catalog by a transactional discipline.
//!
//! An [`Inventory`] lives in a base directory holding a SQLite catalog
//! (`sunburst.db`) and a blob tree (`blob/<ALGO>/<XX>/<REST>.b`). All reads
//! and writes go through a [`Transaction`], which owns one database
//! connection and commits or rolls back catalog rows and blob files
//! together.

mod api;
mod blob_store;
mod error;
mod inventory;
mod schema;
mod transaction;

pub use api::{
    InventoryConfiguration, InventoryReadable, TransactionReadable,
    TransactionWritable,
};
pub use blob_store::BlobStore;
pub use error::InventoryError;
pub use inventory::{Inventory, InventoryReadOnly};
pub use transaction::Transaction;

#[cfg(test)]
mod tests;

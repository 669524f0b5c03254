//! Core library for todow
//!
//! The to-do collection is stored as one JSON document. Every store operation
//! loads it, mutates it and writes it back inside a single transaction.

pub mod collection;
pub mod config;
pub mod item;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use collection::Collection;
pub use config::*;
pub use item::*;
pub use store::*;

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteCollectionStore;

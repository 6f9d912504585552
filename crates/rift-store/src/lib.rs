//! Content-addressed object storage for rift.
//!
//! The diff core never writes history; it only needs to look content up by
//! identifier and to hash working-tree content it has loaded. This crate
//! provides exactly that surface.
//!
//! # Key Types
//!
//! - [`ObjectStore`] -- the store trait every backend implements
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`StoredObject`] / [`Blob`] -- the unit of storage and its blob view
//! - [`ContentHasher`] -- domain-separated BLAKE3 hashing

pub mod error;
pub mod hasher;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, ObjectKind, StoredObject};
pub use traits::ObjectStore;

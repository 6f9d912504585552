//! Foundation types for rift.
//!
//! Every other rift crate depends on `rift-types` for the identifiers and
//! mode bits that describe one side of a change.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (BLAKE3 hash), all-zero when a side is absent
//! - [`FileMode`]: Raw file type and permission bits, as recorded in trees and indexes

pub mod mode;
pub mod object;

pub use mode::FileMode;
pub use object::ObjectId;

//! Diff core for rift.
//!
//! Loads the two sides of each change, decides whether they are binary or
//! text, runs a line diff over text content, and renders the result either
//! as a compact status listing or as a unified patch.
//!
//! # Key Types
//!
//! - [`ChangeList`] / [`Delta`] / [`FileDescriptor`] -- the changes to process
//! - [`ContentRegion`] -- one loaded side, released exactly once
//! - [`DiffVisitor`] / [`Callbacks`] -- receivers for file, hunk and line events
//! - [`DiffOptions`] -- context sizes, whitespace mode, prefixes
//! - [`PatchStats`] -- file and line totals
//!
//! # Entry Points
//!
//! - [`iterate`] -- walk a change list with a visitor
//! - [`render_compact`] / [`render_patch`] -- write output to a [`PatchSink`]
//! - [`diff_contents`] -- diff two buffers directly

pub mod attr;
pub mod blob;
pub mod bridge;
pub mod classify;
pub mod delta;
pub mod engine;
pub mod error;
pub mod iterate;
pub mod loader;
pub mod options;
pub mod render;
pub mod repo;
pub mod stats;
pub mod visitor;

pub use attr::{AttrValue, AttributeLookup, AttributeRules, NoAttributes, DIFF_ATTR};
pub use blob::diff_contents;
pub use delta::{
    BinaryState, ChangeList, Delta, DeltaStatus, FileDescriptor, LineOrigin, Range, Source,
};
pub use error::{DiffError, DiffResult, ErrorKind};
pub use iterate::iterate;
pub use loader::{ContentRegion, Ownership};
pub use options::{DiffOptions, WhitespaceMode};
pub use render::{
    format_line, render_compact, render_compact_to_string, render_patch, render_patch_to_string,
    PatchSink,
};
pub use repo::Repository;
pub use stats::PatchStats;
pub use visitor::{Callbacks, DiffVisitor};

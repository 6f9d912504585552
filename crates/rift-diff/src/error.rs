//! Error types for the diff crate.

use std::path::PathBuf;

use rift_types::ObjectId;

/// Errors that can occur while loading, classifying, diffing or rendering.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A hunk header was missing a required start integer.
    #[error("malformed hunk header: {0:?}")]
    HunkHeader(String),

    /// The buffer for a symlink target could not be reserved.
    #[error("cannot allocate {size} bytes for symlink target")]
    Alloc { size: u64 },

    /// A symlink target was not the length the change list recorded.
    #[error("short read of symlink {path:?}: expected {expected} bytes, got {actual}")]
    ShortSymlinkRead {
        path: PathBuf,
        expected: u64,
        actual: usize,
    },

    /// Memory-mapping a working-tree file failed.
    #[error("cannot map {path:?}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening or reading a file failed.
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hunk/line diffing was reached with neither a hunk nor a line callback.
    #[error("hunk or line diff requested without a hunk or line callback")]
    NoLineCallbacks,

    /// An object referenced by a delta was not found in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] rift_store::StoreError),

    /// Attribute rules could not be parsed or compiled.
    #[error("attribute error: {0}")]
    Attribute(String),

    /// A working-tree side was requested from a repository with no working root.
    #[error("repository has no working directory")]
    MissingWorkdir,

    /// A caller-supplied callback returned a failure.
    #[error("callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of a [`DiffError`], the status code callers switch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Alloc,
    Io,
    Invariant,
    NotFound,
    Store,
    Config,
    Callback,
}

impl DiffError {
    /// Build a callback failure from a message.
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into().into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HunkHeader(_) => ErrorKind::Parse,
            Self::Alloc { .. } => ErrorKind::Alloc,
            Self::ShortSymlinkRead { .. } | Self::Map { .. } | Self::Read { .. } | Self::Io(_) => {
                ErrorKind::Io
            }
            Self::NoLineCallbacks => ErrorKind::Invariant,
            Self::ObjectNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Store,
            Self::Attribute(_) | Self::MissingWorkdir => ErrorKind::Config,
            Self::Callback(_) => ErrorKind::Callback,
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

//! Change records: deltas, their file sides, and the change list that owns
//! them.

use std::sync::Arc;

use rift_types::{FileMode, ObjectId};

use crate::options::DiffOptions;
use crate::repo::Repository;

/// What happened to a path between the old and new side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeltaStatus {
    Unmodified,
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    Ignored,
    Untracked,
}

impl DeltaStatus {
    /// Single-letter code used by compact output, if this status has one.
    pub fn code(&self) -> Option<char> {
        match self {
            Self::Added => Some('A'),
            Self::Deleted => Some('D'),
            Self::Modified => Some('M'),
            Self::Renamed => Some('R'),
            Self::Copied => Some('C'),
            Self::Ignored => Some('I'),
            Self::Untracked => Some('?'),
            Self::Unmodified => None,
        }
    }
}

/// Binary/text classification of a file side or a whole delta.
///
/// Once a value leaves `Unknown` it is never re-derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BinaryState {
    #[default]
    Unknown,
    Text,
    Binary,
}

impl BinaryState {
    pub fn is_resolved(&self) -> bool {
        *self != Self::Unknown
    }
}

/// Hunk coordinates, as decoded from a `@@ -A,B +C,D @@` header.
///
/// A length omitted from the header is recorded as 0 here even though the
/// unified convention reads it as 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
}

/// Origin of a rendered line or output fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineOrigin {
    Context,
    Addition,
    Deletion,
    /// The added side lacks a trailing newline.
    AddEofNewline,
    /// The removed (or shared) side lacks a trailing newline.
    DelEofNewline,
    FileHeader,
    HunkHeader,
    Binary,
}

impl LineOrigin {
    /// The tag character conventionally associated with this origin.
    pub fn as_char(&self) -> char {
        match self {
            Self::Context => ' ',
            Self::Addition => '+',
            Self::Deletion => '-',
            Self::AddEofNewline => '\n',
            Self::DelEofNewline => '\0',
            Self::FileHeader => 'F',
            Self::HunkHeader => 'H',
            Self::Binary => 'B',
        }
    }
}

/// One side (old or new) of a delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Path relative to the repository root. Sides of one delta may share
    /// the same allocation.
    pub path: Arc<str>,
    pub mode: FileMode,
    /// Recorded size in bytes.
    pub size: u64,
    /// Content identifier; null when the side does not exist or its identity
    /// has not been computed yet.
    pub oid: ObjectId,
    /// `false` while `oid` still has to be computed from content.
    pub valid_id: bool,
    pub binary: BinaryState,
}

impl FileDescriptor {
    /// A side that does not exist.
    pub fn absent(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            mode: FileMode::ABSENT,
            size: 0,
            oid: ObjectId::null(),
            valid_id: true,
            binary: BinaryState::Unknown,
        }
    }

    /// A side whose content is known by identifier.
    pub fn stored(path: impl Into<Arc<str>>, mode: FileMode, oid: ObjectId, size: u64) -> Self {
        Self {
            path: path.into(),
            mode,
            size,
            oid,
            valid_id: true,
            binary: BinaryState::Unknown,
        }
    }

    /// A working-tree side whose identifier has not been computed.
    pub fn workdir(path: impl Into<Arc<str>>, mode: FileMode, size: u64) -> Self {
        Self {
            path: path.into(),
            mode,
            size,
            oid: ObjectId::null(),
            valid_id: false,
            binary: BinaryState::Unknown,
        }
    }

    pub fn with_binary(mut self, binary: BinaryState) -> Self {
        self.binary = binary;
        self
    }

    /// Set the classification unless it is already resolved.
    pub(crate) fn mark(&mut self, state: BinaryState) {
        if !self.binary.is_resolved() {
            self.binary = state;
        }
    }
}

/// One recorded change between an old and a new side of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    pub old: FileDescriptor,
    pub new: FileDescriptor,
    pub status: DeltaStatus,
    pub binary: BinaryState,
    /// Rename/copy similarity score (0-100), recorded upstream.
    pub similarity: u32,
}

impl Delta {
    pub fn new(status: DeltaStatus, old: FileDescriptor, new: FileDescriptor) -> Self {
        Self {
            old,
            new,
            status,
            binary: BinaryState::Unknown,
            similarity: 0,
        }
    }

    /// A new file; the old side is absent under the same path.
    pub fn added(new: FileDescriptor) -> Self {
        let old = FileDescriptor::absent(Arc::clone(&new.path));
        Self::new(DeltaStatus::Added, old, new)
    }

    /// A removed file; the new side is absent under the same path.
    pub fn deleted(old: FileDescriptor) -> Self {
        let new = FileDescriptor::absent(Arc::clone(&old.path));
        Self::new(DeltaStatus::Deleted, old, new)
    }

    pub fn modified(old: FileDescriptor, new: FileDescriptor) -> Self {
        Self::new(DeltaStatus::Modified, old, new)
    }

    pub fn renamed(old: FileDescriptor, new: FileDescriptor, similarity: u32) -> Self {
        Self {
            similarity,
            ..Self::new(DeltaStatus::Renamed, old, new)
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary == BinaryState::Binary
    }

    /// Whether both sides name the same path, by reference or by value.
    pub fn same_path(&self) -> bool {
        Arc::ptr_eq(&self.old.path, &self.new.path) || self.old.path == self.new.path
    }
}

/// Where one side of a change list gets its content from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Tree,
    Index,
    Workdir,
}

impl Source {
    /// Whether content for this side is looked up in the object store.
    pub fn is_store_backed(&self) -> bool {
        !matches!(self, Self::Workdir)
    }
}

/// An ordered list of deltas plus the configuration they were produced with.
#[derive(Debug)]
pub struct ChangeList {
    pub(crate) deltas: Vec<Delta>,
    pub(crate) options: DiffOptions,
    pub(crate) repo: Repository,
    pub(crate) old_source: Source,
    pub(crate) new_source: Source,
}

impl ChangeList {
    pub fn new(
        repo: Repository,
        options: DiffOptions,
        old_source: Source,
        new_source: Source,
    ) -> Self {
        Self {
            deltas: Vec::new(),
            options,
            repo,
            old_source,
            new_source,
        }
    }

    pub fn push(&mut self, delta: Delta) {
        self.deltas.push(delta);
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn old_source(&self) -> Source {
        self.old_source
    }

    pub fn new_source(&self) -> Source {
        self.new_source
    }
}

impl Extend<Delta> for ChangeList {
    fn extend<I: IntoIterator<Item = Delta>>(&mut self, iter: I) {
        self.deltas.extend(iter);
    }
}

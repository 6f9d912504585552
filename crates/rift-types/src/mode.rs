use std::fmt;

use serde::{Deserialize, Serialize};

const TYPE_MASK: u32 = 0o170000;
const TYPE_REGULAR: u32 = 0o100000;
const TYPE_SYMLINK: u32 = 0o120000;
const TYPE_DIRECTORY: u32 = 0o040000;
const TYPE_GITLINK: u32 = 0o160000;

/// File type and permission bits for one side of a change.
///
/// Modes are kept as raw bits rather than an enum because a delta's sides
/// may carry any value a tree or working directory recorded, and zero has
/// meaning of its own: the side does not exist.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(u32);

impl FileMode {
    /// No file on this side.
    pub const ABSENT: Self = Self(0);
    /// Normal file (0o100644).
    pub const REGULAR: Self = Self(0o100644);
    /// Executable file (0o100755).
    pub const EXECUTABLE: Self = Self(0o100755);
    /// Symbolic link (0o120000).
    pub const SYMLINK: Self = Self(0o120000);
    /// Subtree / directory (0o040000).
    pub const DIRECTORY: Self = Self(0o040000);
    /// Submodule commit reference (0o160000).
    pub const GITLINK: Self = Self(0o160000);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_absent(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_regular(&self) -> bool {
        self.0 & TYPE_MASK == TYPE_REGULAR
    }

    pub const fn is_symlink(&self) -> bool {
        self.0 & TYPE_MASK == TYPE_SYMLINK
    }

    pub const fn is_dir(&self) -> bool {
        self.0 & TYPE_MASK == TYPE_DIRECTORY
    }

    pub const fn is_gitlink(&self) -> bool {
        self.0 & TYPE_MASK == TYPE_GITLINK
    }

    /// Owner execute bit. Tracked modes are regular enough that this alone
    /// distinguishes 100755 from 100644.
    pub const fn is_executable(&self) -> bool {
        self.0 & 0o100 != 0
    }
}

impl fmt::Debug for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileMode({:o})", self.0)
    }
}

/// Unpadded octal, the form patch headers use (`100644`, `40000`).
impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

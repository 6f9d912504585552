//! Content loading for one side of a delta.
//!
//! A side's bytes come from one of three places: a blob in the object store,
//! a memory-mapped working-tree file, or a symlink target read into a heap
//! buffer. [`ContentRegion`] records which one in a single tag, and
//! [`ContentRegion::release`] dispatches on that tag exactly once.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use rift_store::StoredObject;
use tracing::{debug, trace};

use crate::delta::{FileDescriptor, Source};
use crate::error::{DiffError, DiffResult};
use crate::repo::Repository;

/// How a region's bytes are owned, and so how they are released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Nothing to release.
    None,
    /// A heap buffer owned by the region.
    Heap,
    /// A read-only memory mapping.
    Mapped,
    /// A buffer borrowed from an object store handle.
    Object,
}

enum Backing {
    Empty,
    Heap(Vec<u8>),
    Mapped(Mmap),
    Object(StoredObject),
}

/// A transient view of one side's content.
///
/// Dropping a region releases it; [`release`](Self::release) does the same
/// eagerly and may be called any number of times.
pub struct ContentRegion {
    backing: Backing,
}

impl ContentRegion {
    pub fn empty() -> Self {
        Self {
            backing: Backing::Empty,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Empty => &[],
            Backing::Heap(buf) => buf.as_slice(),
            Backing::Mapped(map) => &map[..],
            Backing::Object(obj) => obj.data.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn ownership(&self) -> Ownership {
        match self.backing {
            Backing::Empty => Ownership::None,
            Backing::Heap(_) => Ownership::Heap,
            Backing::Mapped(_) => Ownership::Mapped,
            Backing::Object(_) => Ownership::Object,
        }
    }

    /// Release whatever the region owns and leave it empty.
    ///
    /// Returns the ownership that was released; a region that was already
    /// released reports [`Ownership::None`] and does nothing.
    pub fn release(&mut self) -> Ownership {
        let released = self.ownership();
        match std::mem::replace(&mut self.backing, Backing::Empty) {
            Backing::Empty => return Ownership::None,
            Backing::Heap(buf) => drop(buf),
            Backing::Mapped(map) => drop(map),
            Backing::Object(obj) => drop(obj),
        }
        trace!(?released, "released content region");
        released
    }
}

impl Drop for ContentRegion {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ContentRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRegion")
            .field("ownership", &self.ownership())
            .field("len", &self.len())
            .finish()
    }
}

/// Whether a recorded size can be addressed on this platform.
pub fn fits_in_memory(size: u64) -> bool {
    usize::try_from(size).is_ok()
}

/// Load one side of a delta from wherever `source` says it lives.
pub fn load(repo: &Repository, source: Source, file: &FileDescriptor) -> DiffResult<ContentRegion> {
    if !fits_in_memory(file.size) {
        debug!(path = %file.path, size = file.size, "side too large to load");
        return Ok(ContentRegion::empty());
    }
    if source.is_store_backed() {
        load_blob(repo, file)
    } else {
        load_workdir(repo, file)
    }
}

fn load_blob(repo: &Repository, file: &FileDescriptor) -> DiffResult<ContentRegion> {
    if file.oid.is_null() {
        return Ok(ContentRegion::empty());
    }
    let object = repo
        .store()
        .read(&file.oid)?
        .ok_or(DiffError::ObjectNotFound(file.oid))?;
    object.blob_content()?;
    trace!(path = %file.path, oid = %file.oid, size = object.size, "loaded blob");
    Ok(ContentRegion {
        backing: Backing::Object(object),
    })
}

fn load_workdir(repo: &Repository, file: &FileDescriptor) -> DiffResult<ContentRegion> {
    let root = repo.workdir().ok_or(DiffError::MissingWorkdir)?;
    let full_path = root.join(&*file.path);
    let region = if file.mode.is_symlink() {
        read_symlink(&full_path, file.size)?
    } else {
        map_file(&full_path)?
    };
    trace!(
        path = %file.path,
        ownership = ?region.ownership(),
        len = region.len(),
        "loaded working-tree side"
    );
    Ok(region)
}

fn read_symlink(path: &Path, size: u64) -> DiffResult<ContentRegion> {
    let capacity = usize::try_from(size)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or(DiffError::Alloc { size })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| DiffError::Alloc { size })?;

    let target = std::fs::read_link(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    buf.extend_from_slice(&link_target_bytes(target));
    if buf.len() as u64 != size {
        return Err(DiffError::ShortSymlinkRead {
            path: path.to_path_buf(),
            expected: size,
            actual: buf.len(),
        });
    }
    Ok(ContentRegion {
        backing: Backing::Heap(buf),
    })
}

fn map_file(path: &Path) -> DiffResult<ContentRegion> {
    let file = File::open(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // SAFETY: the mapping is read-only and lives no longer than the current
    // delta; a concurrent writer can change the bytes we see but not make
    // the slice dangle.
    let map = unsafe { Mmap::map(&file) }.map_err(|source| DiffError::Map {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ContentRegion {
        backing: Backing::Mapped(map),
    })
}

/// The raw bytes of a symlink target, as diffed and hashed.
#[cfg(unix)]
pub fn link_target_bytes(target: PathBuf) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    target.into_os_string().into_vec()
}

#[cfg(not(unix))]
pub fn link_target_bytes(target: PathBuf) -> Vec<u8> {
    target.to_string_lossy().into_owned().into_bytes()
}

//! Diffing two in-memory buffers without a change list.

use rift_store::Blob;
use rift_types::FileMode;
use tracing::debug;

use crate::bridge::Bridge;
use crate::delta::{Delta, DeltaStatus, FileDescriptor};
use crate::engine::EngineConfig;
use crate::error::DiffResult;
use crate::options::DiffOptions;
use crate::visitor::DiffVisitor;

fn side(content: Option<&[u8]>) -> FileDescriptor {
    match content {
        Some(data) => {
            FileDescriptor::stored("", FileMode::REGULAR, Blob::id_for(data), data.len() as u64)
        }
        None => FileDescriptor {
            mode: FileMode::REGULAR,
            ..FileDescriptor::absent("")
        },
    }
}

/// Diff `old` against `new`, sending hunk and line events to `visitor`.
///
/// `None` stands for a side that does not exist. The synthetic delta has an
/// empty path and regular-file modes on both sides; no binary detection is
/// done and no file event is sent. Two absent sides produce no events.
pub fn diff_contents<V>(
    old: Option<&[u8]>,
    new: Option<&[u8]>,
    options: &DiffOptions,
    visitor: &mut V,
) -> DiffResult<()>
where
    V: DiffVisitor + ?Sized,
{
    let (old, new) = if options.reverse { (new, old) } else { (old, new) };

    let status = match (old, new) {
        (Some(_), Some(_)) => DeltaStatus::Modified,
        (None, Some(_)) => DeltaStatus::Added,
        (Some(_), None) => DeltaStatus::Deleted,
        (None, None) => {
            debug!("both contents absent, nothing to diff");
            return Ok(());
        }
    };
    let delta = Delta::new(status, side(old), side(new));

    Bridge::new(&delta, visitor)?.run(
        old.unwrap_or_default(),
        new.unwrap_or_default(),
        &EngineConfig::from_options(options),
    )
}

//! Walking a change list: load, classify and diff each delta in order.

use tracing::{debug, trace};

use crate::bridge::Bridge;
use crate::classify;
use crate::delta::{ChangeList, Delta, DeltaStatus, Source};
use crate::engine::EngineConfig;
use crate::error::DiffResult;
use crate::loader::{self, ContentRegion};
use crate::options::DiffOptions;
use crate::repo::Repository;
use crate::visitor::DiffVisitor;

/// Outcome of hashing a working-tree side whose identity was unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Identity {
    Changed,
    Unchanged,
}

struct Walk<'a> {
    repo: &'a Repository,
    options: &'a DiffOptions,
    old_source: Source,
    new_source: Source,
    engine: EngineConfig,
}

/// Visit every delta of `list` in order.
///
/// Deltas are classified in place, and a delta whose working-tree content
/// hashes to the old identifier is downgraded to
/// [`DeltaStatus::Unmodified`] and skipped. The first error from loading,
/// classification, diffing or the visitor ends the walk and is returned;
/// content loaded for the failing delta is released first.
pub fn iterate<V>(list: &mut ChangeList, visitor: &mut V) -> DiffResult<()>
where
    V: DiffVisitor + ?Sized,
{
    let walk = Walk {
        repo: &list.repo,
        options: &list.options,
        old_source: list.old_source,
        new_source: list.new_source,
        engine: EngineConfig::from_options(&list.options),
    };
    let total = list.deltas.len();
    debug!(deltas = total, "iterating change list");

    for (index, delta) in list.deltas.iter_mut().enumerate() {
        if skip(delta, walk.options) {
            trace!(path = %delta.new.path, status = ?delta.status, "skipping delta");
            continue;
        }
        classify::by_attributes(delta, walk.options, walk.repo)?;

        let progress = index as f32 / total as f32;
        walk.visit(delta, progress, visitor, &mut Regions::new())?;
    }
    Ok(())
}

/// The two sides loaded for one delta.
struct Regions {
    old: ContentRegion,
    new: ContentRegion,
}

impl Regions {
    fn new() -> Self {
        Self {
            old: ContentRegion::empty(),
            new: ContentRegion::empty(),
        }
    }

    fn release(&mut self) {
        self.old.release();
        self.new.release();
    }
}

fn skip(delta: &Delta, options: &DiffOptions) -> bool {
    match delta.status {
        DeltaStatus::Unmodified => true,
        DeltaStatus::Ignored => !options.include_ignored,
        DeltaStatus::Untracked => !options.include_untracked,
        _ => false,
    }
}

impl Walk<'_> {
    /// Process one delta, releasing both regions whether or not it succeeds.
    fn visit<V>(
        &self,
        delta: &mut Delta,
        progress: f32,
        visitor: &mut V,
        regions: &mut Regions,
    ) -> DiffResult<()>
    where
        V: DiffVisitor + ?Sized,
    {
        let outcome = self.process(delta, progress, visitor, &mut regions.old, &mut regions.new);
        regions.release();
        outcome
    }

    fn process<V>(
        &self,
        delta: &mut Delta,
        progress: f32,
        visitor: &mut V,
        old: &mut ContentRegion,
        new: &mut ContentRegion,
    ) -> DiffResult<()>
    where
        V: DiffVisitor + ?Sized,
    {
        let wants_diff = visitor.wants_hunks() || visitor.wants_lines();

        if !delta.is_binary()
            && wants_diff
            && matches!(delta.status, DeltaStatus::Deleted | DeltaStatus::Modified)
        {
            *old = loader::load(self.repo, self.old_source, &delta.old)?;
        }

        let lazy = !delta.new.valid_id;
        if !delta.is_binary()
            && (wants_diff || lazy)
            && matches!(delta.status, DeltaStatus::Added | DeltaStatus::Modified)
        {
            *new = loader::load(self.repo, self.new_source, &delta.new)?;
            if lazy && self.settle_identity(delta, new.as_bytes()) == Identity::Unchanged {
                delta.status = DeltaStatus::Unmodified;
                debug!(path = %delta.new.path, "content unchanged after hashing, skipping");
                return Ok(());
            }
        }

        if !delta.binary.is_resolved() {
            classify::by_content(delta, old.as_bytes(), new.as_bytes());
        }

        if visitor.wants_file() {
            visitor.file(delta, progress)?;
        }

        if delta.is_binary() || (old.is_empty() && new.is_empty()) || !wants_diff {
            return Ok(());
        }

        Bridge::new(delta, visitor)?.run(old.as_bytes(), new.as_bytes(), &self.engine)
    }

    fn settle_identity(&self, delta: &mut Delta, content: &[u8]) -> Identity {
        delta.new.oid = self.repo.hash_content(content);
        delta.new.valid_id = true;
        if delta.new.oid == delta.old.oid {
            Identity::Unchanged
        } else {
            Identity::Changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rift_store::InMemoryObjectStore;
    use rift_types::FileMode;

    use crate::delta::{BinaryState, FileDescriptor, LineOrigin};
    use crate::error::DiffError;
    use crate::loader::Ownership;
    use crate::visitor::Callbacks;

    fn store_list(store: &Arc<InMemoryObjectStore>, options: DiffOptions) -> ChangeList {
        ChangeList::new(
            Repository::new(store.clone()),
            options,
            Source::Tree,
            Source::Index,
        )
    }

    fn stored(store: &InMemoryObjectStore, path: &str, data: &[u8]) -> FileDescriptor {
        let oid = store.write_blob(data).unwrap();
        FileDescriptor::stored(path, FileMode::REGULAR, oid, data.len() as u64)
    }

    #[test]
    fn skips_unmodified_ignored_and_untracked() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        for status in [DeltaStatus::Unmodified, DeltaStatus::Ignored, DeltaStatus::Untracked] {
            let side = stored(&store, "x", b"x\n");
            list.push(Delta::new(status, side.clone(), side));
        }

        let mut files = 0;
        iterate(&mut list, &mut Callbacks::new().on_file(|_, _| {
            files += 1;
            Ok(())
        }))
        .unwrap();
        assert_eq!(files, 0);

        let mut list = store_list(
            &store,
            DiffOptions {
                include_ignored: true,
                include_untracked: true,
                ..Default::default()
            },
        );
        for status in [DeltaStatus::Ignored, DeltaStatus::Untracked] {
            list.push(Delta::new(status, FileDescriptor::absent("y"), FileDescriptor::absent("y")));
        }
        let mut files = 0;
        iterate(&mut list, &mut Callbacks::new().on_file(|_, _| {
            files += 1;
            Ok(())
        }))
        .unwrap();
        assert_eq!(files, 2);
    }

    #[test]
    fn progress_is_index_over_total() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        for name in ["a", "b", "c", "d"] {
            list.push(Delta::added(stored(&store, name, b"1\n")));
        }
        let mut progress = Vec::new();
        iterate(&mut list, &mut Callbacks::new().on_file(|_, p| {
            progress.push(p);
            Ok(())
        }))
        .unwrap();
        assert_eq!(progress, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn compact_walk_does_not_load_stored_content() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        list.push(Delta::modified(
            stored(&store, "a", b"1\n"),
            stored(&store, "a", b"2\n"),
        ));
        iterate(&mut list, &mut Callbacks::new().on_file(|_, _| Ok(()))).unwrap();
        assert_eq!(store.read_count(), 0);
        // Nothing loaded, so the sniff saw two empty regions.
        assert_eq!(list.deltas()[0].binary, BinaryState::Text);
    }

    #[test]
    fn lines_flow_for_a_modified_blob() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        list.push(Delta::modified(
            stored(&store, "a", b"keep\nold\n"),
            stored(&store, "a", b"keep\nnew\n"),
        ));
        let mut lines = Vec::new();
        iterate(&mut list, &mut Callbacks::new().on_line(|_, origin, content| {
            lines.push((origin, String::from_utf8_lossy(content).into_owned()));
            Ok(())
        }))
        .unwrap();
        assert_eq!(
            lines,
            vec![
                (LineOrigin::Context, "keep\n".to_string()),
                (LineOrigin::Deletion, "old\n".to_string()),
                (LineOrigin::Addition, "new\n".to_string()),
            ]
        );
    }

    #[test]
    fn binary_delta_gets_file_event_but_no_lines() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        list.push(Delta::modified(
            stored(&store, "bin", b"\0\x01\x02"),
            stored(&store, "bin", b"\0\x03"),
        ));
        let (mut files, mut lines) = (0, 0);
        let mut callbacks = Callbacks::new()
            .on_file(|delta, _| {
                assert!(delta.is_binary());
                files += 1;
                Ok(())
            })
            .on_line(|_, _, _| {
                lines += 1;
                Ok(())
            });
        iterate(&mut list, &mut callbacks).unwrap();
        drop(callbacks);
        assert_eq!((files, lines), (1, 0));
    }

    #[test]
    fn unchanged_workdir_file_is_downgraded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("same.txt"), b"same\n").unwrap();
        std::fs::write(dir.path().join("diff.txt"), b"after\n").unwrap();

        let store = Arc::new(InMemoryObjectStore::new());
        let repo = Repository::new(store.clone()).with_workdir(dir.path());
        let mut list =
            ChangeList::new(repo, DiffOptions::default(), Source::Index, Source::Workdir);
        list.push(Delta::modified(
            stored(&store, "same.txt", b"same\n"),
            FileDescriptor::workdir("same.txt", FileMode::REGULAR, 5),
        ));
        list.push(Delta::modified(
            stored(&store, "diff.txt", b"before\n"),
            FileDescriptor::workdir("diff.txt", FileMode::REGULAR, 6),
        ));

        let mut paths = Vec::new();
        iterate(&mut list, &mut Callbacks::new().on_file(|delta, _| {
            paths.push(delta.new.path.to_string());
            Ok(())
        }))
        .unwrap();

        assert_eq!(paths, vec!["diff.txt"]);
        assert_eq!(list.deltas()[0].status, DeltaStatus::Unmodified);
        assert!(list.deltas()[0].new.valid_id);
        assert_eq!(list.deltas()[1].status, DeltaStatus::Modified);
        assert_eq!(list.deltas()[1].new.oid, Repository::new(store).hash_content(b"after\n"));
    }

    #[test]
    fn callback_error_stops_the_walk() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        for name in ["a", "b", "c"] {
            list.push(Delta::added(stored(&store, name, b"x\n")));
        }
        let mut visited = Vec::new();
        let err = iterate(&mut list, &mut Callbacks::new().on_file(|delta, _| {
            visited.push(delta.new.path.to_string());
            if &*delta.new.path == "b" {
                Err(DiffError::callback("abort"))
            } else {
                Ok(())
            }
        }))
        .unwrap_err();
        assert!(matches!(err, DiffError::Callback(_)));
        assert_eq!(visited, vec!["a", "b"]);
    }

    #[test]
    fn load_error_aborts_with_that_error() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut list = store_list(&store, DiffOptions::default());
        let missing = rift_types::ObjectId::from_bytes(b"nowhere");
        list.push(Delta::added(FileDescriptor::stored("gone", FileMode::REGULAR, missing, 3)));
        let err = iterate(&mut list, &mut Callbacks::new().on_line(|_, _, _| Ok(()))).unwrap_err();
        assert!(matches!(err, DiffError::ObjectNotFound(id) if id == missing));
    }

    #[test]
    fn loaded_side_is_released_when_the_other_side_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryObjectStore::new());
        let repo = Repository::new(store.clone()).with_workdir(dir.path());
        let options = DiffOptions::default();
        let walk = Walk {
            repo: &repo,
            options: &options,
            old_source: Source::Tree,
            new_source: Source::Workdir,
            engine: EngineConfig::default(),
        };
        let mut delta = Delta::modified(
            stored(&store, "vanished", b"old\n"),
            FileDescriptor::workdir("vanished", FileMode::REGULAR, 4),
        );

        let mut regions = Regions::new();
        let mut visitor = Callbacks::new().on_line(|_, _, _| Ok(()));
        let err = walk.visit(&mut delta, 0.0, &mut visitor, &mut regions).unwrap_err();

        assert!(matches!(err, DiffError::Read { .. }));
        assert_eq!(store.read_count(), 1);
        assert_eq!(regions.old.ownership(), Ownership::None);
        assert_eq!(regions.new.ownership(), Ownership::None);
    }
}

//! Summary counts over a change list.

use serde::Serialize;

use crate::delta::{ChangeList, Delta, LineOrigin};
use crate::error::DiffResult;
use crate::iterate::iterate;
use crate::visitor::DiffVisitor;

/// File and line totals for one walk of a change list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatchStats {
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
    /// Files classified as binary; these contribute no line counts.
    pub binary: usize,
}

impl PatchStats {
    /// Walk `list` and count what a patch of it would contain.
    pub fn collect(list: &mut ChangeList) -> DiffResult<Self> {
        let mut stats = Self::default();
        iterate(list, &mut stats)?;
        Ok(stats)
    }

    pub fn is_empty(&self) -> bool {
        self.files == 0
    }
}

impl DiffVisitor for PatchStats {
    fn wants_hunks(&self) -> bool {
        false
    }

    fn file(&mut self, delta: &Delta, _progress: f32) -> DiffResult<()> {
        self.files += 1;
        if delta.is_binary() {
            self.binary += 1;
        }
        Ok(())
    }

    fn line(&mut self, _delta: &Delta, origin: LineOrigin, _content: &[u8]) -> DiffResult<()> {
        match origin {
            LineOrigin::Addition => self.additions += 1,
            LineOrigin::Deletion => self.deletions += 1,
            _ => {}
        }
        Ok(())
    }
}

impl std::fmt::Display for PatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let noun = if self.files == 1 { "file" } else { "files" };
        write!(
            f,
            "{} {noun} changed, {} insertions(+), {} deletions(-)",
            self.files, self.additions, self.deletions
        )
    }
}

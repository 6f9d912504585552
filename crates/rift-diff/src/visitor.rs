//! Callbacks invoked while walking a change list.

use crate::delta::{Delta, LineOrigin, Range};
use crate::error::DiffResult;

/// Receiver for file, hunk and line events.
///
/// The `wants_*` methods report which events the visitor cares about; the
/// iterator uses them to avoid loading content nobody will look at. Any
/// `Err` returned from an event stops the walk and is handed back to the
/// caller unchanged.
pub trait DiffVisitor {
    fn wants_file(&self) -> bool {
        true
    }

    fn wants_hunks(&self) -> bool {
        true
    }

    fn wants_lines(&self) -> bool {
        true
    }

    /// Called once per processed delta with `index / total`.
    fn file(&mut self, _delta: &Delta, _progress: f32) -> DiffResult<()> {
        Ok(())
    }

    /// Called at the start of each hunk with the decoded range and the raw
    /// header text.
    fn hunk(&mut self, _delta: &Delta, _range: &Range, _header: &[u8]) -> DiffResult<()> {
        Ok(())
    }

    fn line(&mut self, _delta: &Delta, _origin: LineOrigin, _content: &[u8]) -> DiffResult<()> {
        Ok(())
    }
}

impl<V: DiffVisitor + ?Sized> DiffVisitor for &mut V {
    fn wants_file(&self) -> bool {
        (**self).wants_file()
    }

    fn wants_hunks(&self) -> bool {
        (**self).wants_hunks()
    }

    fn wants_lines(&self) -> bool {
        (**self).wants_lines()
    }

    fn file(&mut self, delta: &Delta, progress: f32) -> DiffResult<()> {
        (**self).file(delta, progress)
    }

    fn hunk(&mut self, delta: &Delta, range: &Range, header: &[u8]) -> DiffResult<()> {
        (**self).hunk(delta, range, header)
    }

    fn line(&mut self, delta: &Delta, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        (**self).line(delta, origin, content)
    }
}

type FileFn<'a> = Box<dyn FnMut(&Delta, f32) -> DiffResult<()> + 'a>;
type HunkFn<'a> = Box<dyn FnMut(&Delta, &Range, &[u8]) -> DiffResult<()> + 'a>;
type LineFn<'a> = Box<dyn FnMut(&Delta, LineOrigin, &[u8]) -> DiffResult<()> + 'a>;

/// A visitor assembled from optional closures.
///
/// Only the events with a registered closure are wanted.
///
/// ```
/// use rift_diff::Callbacks;
///
/// let mut lines = 0;
/// let callbacks = Callbacks::new().on_line(|_, _, _| {
///     lines += 1;
///     Ok(())
/// });
/// # drop(callbacks);
/// ```
#[derive(Default)]
pub struct Callbacks<'a> {
    file: Option<FileFn<'a>>,
    hunk: Option<HunkFn<'a>>,
    line: Option<LineFn<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_file(mut self, f: impl FnMut(&Delta, f32) -> DiffResult<()> + 'a) -> Self {
        self.file = Some(Box::new(f));
        self
    }

    pub fn on_hunk(mut self, f: impl FnMut(&Delta, &Range, &[u8]) -> DiffResult<()> + 'a) -> Self {
        self.hunk = Some(Box::new(f));
        self
    }

    pub fn on_line(
        mut self,
        f: impl FnMut(&Delta, LineOrigin, &[u8]) -> DiffResult<()> + 'a,
    ) -> Self {
        self.line = Some(Box::new(f));
        self
    }
}

impl DiffVisitor for Callbacks<'_> {
    fn wants_file(&self) -> bool {
        self.file.is_some()
    }

    fn wants_hunks(&self) -> bool {
        self.hunk.is_some()
    }

    fn wants_lines(&self) -> bool {
        self.line.is_some()
    }

    fn file(&mut self, delta: &Delta, progress: f32) -> DiffResult<()> {
        match self.file.as_mut() {
            Some(f) => f(delta, progress),
            None => Ok(()),
        }
    }

    fn hunk(&mut self, delta: &Delta, range: &Range, header: &[u8]) -> DiffResult<()> {
        match self.hunk.as_mut() {
            Some(f) => f(delta, range, header),
            None => Ok(()),
        }
    }

    fn line(&mut self, delta: &Delta, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        match self.line.as_mut() {
            Some(f) => f(delta, origin, content),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("file", &self.file.is_some())
            .field("hunk", &self.hunk.is_some())
            .field("line", &self.line.is_some())
            .finish()
    }
}

//! Patch output: a compact status listing and unified diff text.
//!
//! Both presentations are [`DiffVisitor`]s driven by [`iterate`]. Each
//! builds one fragment at a time in a scratch buffer owned by the render
//! call, hands it to a [`PatchSink`], and clears the buffer before the next
//! fragment.

use rift_types::FileMode;

use crate::delta::{ChangeList, Delta, FileDescriptor, LineOrigin, Range};
use crate::error::DiffResult;
use crate::iterate::iterate;
use crate::visitor::DiffVisitor;

/// Destination for rendered fragments.
pub trait PatchSink {
    fn emit(&mut self, origin: LineOrigin, content: &[u8]) -> DiffResult<()>;
}

impl<F> PatchSink for F
where
    F: FnMut(LineOrigin, &[u8]) -> DiffResult<()>,
{
    fn emit(&mut self, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        self(origin, content)
    }
}

/// Render one status line per delta.
pub fn render_compact<S>(list: &mut ChangeList, sink: &mut S) -> DiffResult<()>
where
    S: PatchSink + ?Sized,
{
    let mut printer = CompactPrinter {
        sink,
        scratch: Vec::new(),
    };
    iterate(list, &mut printer)
}

/// Render a unified patch for every delta.
pub fn render_patch<S>(list: &mut ChangeList, sink: &mut S) -> DiffResult<()>
where
    S: PatchSink + ?Sized,
{
    let mut printer = PatchPrinter {
        old_prefix: list.options.old_prefix.clone(),
        new_prefix: list.options.new_prefix.clone(),
        sink,
        scratch: Vec::new(),
    };
    iterate(list, &mut printer)
}

pub fn render_compact_to_string(list: &mut ChangeList) -> DiffResult<String> {
    let mut out = Vec::new();
    render_compact(list, &mut |_: LineOrigin, content: &[u8]| -> DiffResult<()> {
        out.extend_from_slice(content);
        Ok(())
    })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn render_patch_to_string(list: &mut ChangeList) -> DiffResult<String> {
    let mut out = Vec::new();
    render_patch(list, &mut |_: LineOrigin, content: &[u8]| -> DiffResult<()> {
        out.extend_from_slice(content);
        Ok(())
    })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Append the patch text for one line event to `out`.
///
/// Additions, deletions and context get their origin character as a
/// prefix; end-of-file markers are copied as is. Returns `false` when the
/// event renders to nothing.
pub fn format_line(origin: LineOrigin, content: &[u8], out: &mut Vec<u8>) -> bool {
    match origin {
        LineOrigin::Addition | LineOrigin::Deletion | LineOrigin::Context => {
            out.push(origin.as_char() as u8);
            out.extend_from_slice(content);
            true
        }
        _ if content.is_empty() => false,
        _ => {
            out.extend_from_slice(content);
            true
        }
    }
}

fn mode_suffix(mode: FileMode) -> char {
    if mode.is_dir() {
        '/'
    } else if mode.is_executable() {
        '*'
    } else {
        ' '
    }
}

/// One `X\tpath` line per delta.
///
/// Unchanged paths are always shown with the old side's suffix, so an added
/// file never carries one. A mode change prints both modes and no suffix:
/// `M\ta.txt (100644 -> 100755)`.
struct CompactPrinter<'s, S: ?Sized> {
    sink: &'s mut S,
    scratch: Vec<u8>,
}

impl<S: PatchSink + ?Sized> DiffVisitor for CompactPrinter<'_, S> {
    fn wants_hunks(&self) -> bool {
        false
    }

    fn wants_lines(&self) -> bool {
        false
    }

    fn file(&mut self, delta: &Delta, _progress: f32) -> DiffResult<()> {
        let Some(code) = delta.status.code() else {
            return Ok(());
        };
        let (old, new) = (&delta.old, &delta.new);
        let old_suffix = mode_suffix(old.mode);
        let new_suffix = mode_suffix(new.mode);

        let line = if !delta.same_path() {
            format!("{code}\t{}{old_suffix} -> {}{new_suffix}\n", old.path, new.path)
        } else if !old.mode.is_absent() && !new.mode.is_absent() && old.mode != new.mode {
            format!("{code}\t{} ({} -> {})\n", old.path, old.mode, new.mode)
        } else if old_suffix != ' ' {
            format!("{code}\t{}{old_suffix}\n", old.path)
        } else {
            format!("{code}\t{}\n", old.path)
        };

        self.scratch.clear();
        self.scratch.extend_from_slice(line.as_bytes());
        self.sink.emit(LineOrigin::FileHeader, &self.scratch)
    }
}

struct PatchPrinter<'s, S: ?Sized> {
    old_prefix: String,
    new_prefix: String,
    sink: &'s mut S,
    scratch: Vec<u8>,
}

/// A side is shown as `/dev/null` only when it is known not to exist; an
/// unhashed working-tree side also has a null identifier.
fn is_absent(side: &FileDescriptor) -> bool {
    side.valid_id && side.oid.is_null()
}

fn display<'a>(side: &'a FileDescriptor, prefix: &'a str) -> (&'a str, &'a str) {
    if is_absent(side) {
        ("", "/dev/null")
    } else {
        (prefix, &*side.path)
    }
}

impl<S: PatchSink + ?Sized> PatchPrinter<'_, S> {
    fn flush(&mut self, origin: LineOrigin) -> DiffResult<()> {
        let result = self.sink.emit(origin, &self.scratch);
        self.scratch.clear();
        result
    }

    fn header(&self, delta: &Delta) -> String {
        let (old, new) = (&delta.old, &delta.new);
        let mut text = format!(
            "diff --git {}{} {}{}\n",
            self.old_prefix, old.path, self.new_prefix, new.path
        );

        let old_id = old.oid.abbrev(rift_types::ObjectId::ABBREV_LEN);
        let new_id = new.oid.abbrev(rift_types::ObjectId::ABBREV_LEN);
        if old.mode == new.mode {
            text.push_str(&format!("index {old_id}..{new_id} {}\n", old.mode));
        } else {
            if old.mode.is_absent() {
                text.push_str(&format!("new file mode {}\n", new.mode));
            } else if new.mode.is_absent() {
                text.push_str(&format!("deleted file mode {}\n", old.mode));
            } else {
                text.push_str(&format!("old mode {}\n", old.mode));
                text.push_str(&format!("new mode {}\n", new.mode));
            }
            text.push_str(&format!("index {old_id}..{new_id}\n"));
        }
        text
    }
}

impl<S: PatchSink + ?Sized> DiffVisitor for PatchPrinter<'_, S> {
    fn file(&mut self, delta: &Delta, _progress: f32) -> DiffResult<()> {
        let mut text = self.header(delta);
        let (old_prefix, old_path) = display(&delta.old, &self.old_prefix);
        let (new_prefix, new_path) = display(&delta.new, &self.new_prefix);

        if delta.is_binary() {
            let binary =
                format!("Binary files {old_prefix}{old_path} and {new_prefix}{new_path} differ\n");
            self.scratch.clear();
            self.scratch.extend_from_slice(text.as_bytes());
            self.flush(LineOrigin::FileHeader)?;
            self.scratch.extend_from_slice(binary.as_bytes());
            return self.flush(LineOrigin::Binary);
        }

        text.push_str(&format!("--- {old_prefix}{old_path}\n+++ {new_prefix}{new_path}\n"));
        self.scratch.clear();
        self.scratch.extend_from_slice(text.as_bytes());
        self.flush(LineOrigin::FileHeader)
    }

    fn hunk(&mut self, _delta: &Delta, _range: &Range, header: &[u8]) -> DiffResult<()> {
        self.scratch.clear();
        self.scratch.extend_from_slice(header);
        self.flush(LineOrigin::HunkHeader)
    }

    fn line(&mut self, _delta: &Delta, origin: LineOrigin, content: &[u8]) -> DiffResult<()> {
        self.scratch.clear();
        if !format_line(origin, content, &mut self.scratch) {
            return Ok(());
        }
        self.flush(origin)
    }
}

//! The line-level diff engine.
//!
//! Lines are compared as keys (normalized per the whitespace mode), the edit
//! script comes from `similar`'s Myers implementation, and changes are
//! grouped into hunks with leading and trailing context. Output is a stream
//! of typed [`Record`]s in unified order: one header per hunk, then the
//! hunk's lines, with an end-of-file record after any line that lacks its
//! newline.

use std::borrow::Cow;
use std::ops::Range;

use similar::{capture_diff_slices, Algorithm, DiffTag};

use crate::error::DiffResult;
use crate::options::{DiffOptions, WhitespaceMode};

/// Text following a line that has no trailing newline.
pub const NO_NEWLINE_MARKER: &[u8] = b"\n\\ No newline at end of file\n";

/// Settings the engine needs from [`DiffOptions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub context: usize,
    pub interhunk: usize,
    pub whitespace: WhitespaceMode,
}

impl EngineConfig {
    pub fn from_options(options: &DiffOptions) -> Self {
        Self {
            context: options.context(),
            interhunk: options.interhunk(),
            whitespace: options.whitespace,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_options(&DiffOptions::default())
    }
}

/// One raw event from the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record<'a> {
    /// A full `@@ -A,B +C,D @@` line, newline included.
    Header(&'a [u8]),
    /// One line with its marker byte (`' '`, `'+'` or `'-'`); content
    /// keeps its newline when it has one.
    Line { marker: u8, content: &'a [u8] },
    /// The line just emitted with `marker` had no trailing newline.
    EndOfFile { marker: u8, text: &'a [u8] },
}

/// A maximal run of non-equal edits, as half-open line ranges.
#[derive(Clone, Debug)]
struct Change {
    old: Range<usize>,
    new: Range<usize>,
}

/// Diff `old` against `new` line by line, feeding records to `emit`.
///
/// The first error returned by `emit` stops the diff and is returned.
pub fn diff_lines<F>(old: &[u8], new: &[u8], config: &EngineConfig, mut emit: F) -> DiffResult<()>
where
    F: FnMut(Record<'_>) -> DiffResult<()>,
{
    let old_lines: Vec<&[u8]> = old.split_inclusive(|&b| b == b'\n').collect();
    let new_lines: Vec<&[u8]> = new.split_inclusive(|&b| b == b'\n').collect();

    let old_keys: Vec<_> = old_lines.iter().map(|l| line_key(l, config.whitespace)).collect();
    let new_keys: Vec<_> = new_lines.iter().map(|l| line_key(l, config.whitespace)).collect();

    let changes = collect_changes(&old_keys, &new_keys);
    if changes.is_empty() {
        return Ok(());
    }

    let max_gap = 2 * config.context + config.interhunk;
    let mut first = 0;
    while first < changes.len() {
        let mut last = first;
        while last + 1 < changes.len()
            && changes[last + 1].old.start - changes[last].old.end <= max_gap
        {
            last += 1;
        }
        emit_hunk(
            &changes[first..=last],
            &old_lines,
            &new_lines,
            config.context,
            &mut emit,
        )?;
        first = last + 1;
    }
    Ok(())
}

fn collect_changes<K: Eq + std::hash::Hash + Ord>(old: &[K], new: &[K]) -> Vec<Change> {
    let mut changes: Vec<Change> = Vec::new();
    let mut open: Option<Change> = None;
    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            changes.extend(open.take());
            continue;
        }
        match open.as_mut() {
            Some(change) => {
                change.old.end = old_range.end;
                change.new.end = new_range.end;
            }
            None => {
                open = Some(Change {
                    old: old_range,
                    new: new_range,
                })
            }
        }
    }
    changes.extend(open);
    changes
}

fn emit_hunk<F>(
    group: &[Change],
    old_lines: &[&[u8]],
    new_lines: &[&[u8]],
    context: usize,
    emit: &mut F,
) -> DiffResult<()>
where
    F: FnMut(Record<'_>) -> DiffResult<()>,
{
    let (Some(head), Some(tail)) = (group.first(), group.last()) else {
        return Ok(());
    };
    let lead = head.old.start.min(context);
    let trail = (old_lines.len() - tail.old.end).min(context);

    let old_span = (head.old.start - lead)..(tail.old.end + trail);
    let new_span = (head.new.start - lead)..(tail.new.end + trail);

    let header = format!(
        "@@ -{} +{} @@\n",
        side_coords(&old_span),
        side_coords(&new_span)
    );
    emit(Record::Header(header.as_bytes()))?;

    let mut cursor = old_span.start;
    for change in group {
        emit_run(b' ', &old_lines[cursor..change.old.start], emit)?;
        emit_run(b'-', &old_lines[change.old.clone()], emit)?;
        emit_run(b'+', &new_lines[change.new.clone()], emit)?;
        cursor = change.old.end;
    }
    emit_run(b' ', &old_lines[cursor..old_span.end], emit)
}

fn emit_run<F>(marker: u8, lines: &[&[u8]], emit: &mut F) -> DiffResult<()>
where
    F: FnMut(Record<'_>) -> DiffResult<()>,
{
    for line in lines {
        emit(Record::Line {
            marker,
            content: line,
        })?;
        if !line.ends_with(b"\n") {
            emit(Record::EndOfFile {
                marker,
                text: NO_NEWLINE_MARKER,
            })?;
        }
    }
    Ok(())
}

/// `start[,count]` for one side of a header. An empty side reports the line
/// before it, and a count of one is left implicit.
fn side_coords(span: &Range<usize>) -> String {
    let count = span.len();
    let start = if count == 0 { span.start } else { span.start + 1 };
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

fn line_key(line: &[u8], mode: WhitespaceMode) -> (Cow<'_, [u8]>, bool) {
    let (body, terminated) = match line.strip_suffix(b"\n") {
        Some(body) => (body, true),
        None => (line, false),
    };
    let key = match mode {
        WhitespaceMode::None => Cow::Borrowed(body),
        WhitespaceMode::Eol => Cow::Borrowed(body.trim_ascii_end()),
        WhitespaceMode::All => Cow::Owned(
            body.iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect(),
        ),
        WhitespaceMode::Change => {
            let mut out = Vec::with_capacity(body.len());
            let mut pending_space = false;
            for &b in body {
                if b.is_ascii_whitespace() {
                    pending_space = true;
                } else {
                    if pending_space {
                        out.push(b' ');
                        pending_space = false;
                    }
                    out.push(b);
                }
            }
            Cow::Owned(out)
        }
    };
    (key, terminated)
}

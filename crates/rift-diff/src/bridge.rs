//! Adapter between engine records and visitor events.
//!
//! Header records are decoded into a [`Range`] and forwarded as hunk
//! events; line and end-of-file records become line events with a
//! [`LineOrigin`] derived from their marker byte.

use crate::delta::{Delta, LineOrigin, Range};
use crate::engine::{self, EngineConfig, Record};
use crate::error::{DiffError, DiffResult};
use crate::visitor::DiffVisitor;

/// Failure to read an integer from a hunk header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no digits found")]
    NoDigits,
    #[error("integer overflow")]
    Overflow,
}

/// Skip to the next run of ASCII digits and read it as a decimal number.
///
/// Returns the value and the input following the digits.
pub fn next_int(input: &[u8]) -> Result<(usize, &[u8]), TokenError> {
    let start = input
        .iter()
        .position(u8::is_ascii_digit)
        .ok_or(TokenError::NoDigits)?;
    let digits = &input[start..];
    let len = digits
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    let mut value: usize = 0;
    for &b in &digits[..len] {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(b - b'0')))
            .ok_or(TokenError::Overflow)?;
    }
    Ok((value, &digits[len..]))
}

/// Decode `@@ -A[,B] +C[,D] @@`. Omitted lengths are recorded as 0.
pub fn parse_hunk_header(header: &[u8]) -> DiffResult<Range> {
    let malformed = |_| DiffError::HunkHeader(String::from_utf8_lossy(header).into_owned());

    if header.first() != Some(&b'@') {
        return Err(malformed(TokenError::NoDigits));
    }
    let (old_start, rest) = next_int(header).map_err(malformed)?;
    let (old_lines, rest) = optional_len(rest).map_err(malformed)?;
    let (new_start, rest) = next_int(rest).map_err(malformed)?;
    let (new_lines, _) = optional_len(rest).map_err(malformed)?;

    Ok(Range {
        old_start,
        old_lines,
        new_start,
        new_lines,
    })
}

fn optional_len(input: &[u8]) -> Result<(usize, &[u8]), TokenError> {
    if input.first() == Some(&b',') {
        next_int(input)
    } else {
        Ok((0, input))
    }
}

fn line_origin(marker: u8) -> LineOrigin {
    match marker {
        b'+' => LineOrigin::Addition,
        b'-' => LineOrigin::Deletion,
        _ => LineOrigin::Context,
    }
}

fn eof_origin(marker: u8) -> LineOrigin {
    if marker == b'+' {
        LineOrigin::AddEofNewline
    } else {
        LineOrigin::DelEofNewline
    }
}

/// Forwards engine records for one delta to a visitor.
pub struct Bridge<'d, 'v, V: DiffVisitor + ?Sized> {
    delta: &'d Delta,
    visitor: &'v mut V,
    wants_hunks: bool,
    wants_lines: bool,
}

impl<'d, 'v, V: DiffVisitor + ?Sized> Bridge<'d, 'v, V> {
    /// Fails with [`DiffError::NoLineCallbacks`] if the visitor wants
    /// neither hunks nor lines.
    pub fn new(delta: &'d Delta, visitor: &'v mut V) -> DiffResult<Self> {
        let wants_hunks = visitor.wants_hunks();
        let wants_lines = visitor.wants_lines();
        if !wants_hunks && !wants_lines {
            return Err(DiffError::NoLineCallbacks);
        }
        Ok(Self {
            delta,
            visitor,
            wants_hunks,
            wants_lines,
        })
    }

    pub fn handle(&mut self, record: Record<'_>) -> DiffResult<()> {
        match record {
            Record::Header(text) if self.wants_hunks && text.first() == Some(&b'@') => {
                let range = parse_hunk_header(text)?;
                self.visitor.hunk(self.delta, &range, text)
            }
            Record::Line { marker, content } if self.wants_lines => {
                self.visitor.line(self.delta, line_origin(marker), content)
            }
            Record::EndOfFile { marker, text } if self.wants_lines => {
                self.visitor.line(self.delta, eof_origin(marker), text)
            }
            _ => Ok(()),
        }
    }

    /// Diff `old` against `new` and forward every record.
    pub fn run(mut self, old: &[u8], new: &[u8], config: &EngineConfig) -> DiffResult<()> {
        engine::diff_lines(old, new, config, |record| self.handle(record))
    }
}

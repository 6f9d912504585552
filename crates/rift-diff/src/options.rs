//! Diff options: context sizes, whitespace handling, inclusion switches and
//! display prefixes.

use serde::{Deserialize, Serialize};

/// Context lines used when the configured value is zero.
pub const DEFAULT_CONTEXT_LINES: usize = 3;
/// Inter-hunk context used when the configured value is zero.
pub const DEFAULT_INTERHUNK_LINES: usize = 3;

/// How whitespace differences are treated when comparing lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespaceMode {
    /// Every byte counts.
    #[default]
    None,
    /// Ignore all whitespace.
    All,
    /// Ignore changes in the amount of whitespace.
    Change,
    /// Ignore whitespace at end of line.
    Eol,
}

/// Configuration for one diff run.
///
/// A zero `context_lines` or `interhunk_lines` selects the default of 3;
/// use [`DiffOptions::context`] and [`DiffOptions::interhunk`] to read the
/// effective values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Unchanged lines shown around each change.
    pub context_lines: usize,
    /// Extra unchanged lines allowed between two changes before they are
    /// split into separate hunks.
    pub interhunk_lines: usize,
    pub whitespace: WhitespaceMode,
    /// Treat every file as text, skipping binary detection.
    pub force_text: bool,
    /// Swap the old and new sides (content diffs only).
    pub reverse: bool,
    pub include_ignored: bool,
    pub include_untracked: bool,
    /// Display prefix for old-side paths.
    pub old_prefix: String,
    /// Display prefix for new-side paths.
    pub new_prefix: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            interhunk_lines: DEFAULT_INTERHUNK_LINES,
            whitespace: WhitespaceMode::None,
            force_text: false,
            reverse: false,
            include_ignored: false,
            include_untracked: false,
            old_prefix: "a/".to_string(),
            new_prefix: "b/".to_string(),
        }
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective context line count.
    pub fn context(&self) -> usize {
        if self.context_lines == 0 {
            DEFAULT_CONTEXT_LINES
        } else {
            self.context_lines
        }
    }

    /// Effective inter-hunk context count.
    pub fn interhunk(&self) -> usize {
        if self.interhunk_lines == 0 {
            DEFAULT_INTERHUNK_LINES
        } else {
            self.interhunk_lines
        }
    }
}

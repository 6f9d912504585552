//! Option loading: an optional TOML file, then command-line flags on top.
//!
//! ```toml
//! [diff]
//! context_lines = 5
//! whitespace = "eol"
//! old_prefix = "before/"
//! ```

use std::path::Path;

use anyhow::Context;
use rift_diff::{DiffOptions, WhitespaceMode};
use serde::Deserialize;

use crate::cli::DiffFlags;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffOptions,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Resolve the options for one command.
pub fn resolve(flags: &DiffFlags) -> anyhow::Result<DiffOptions> {
    let mut options = match &flags.config {
        Some(path) => Config::load(path)?.diff,
        None => DiffOptions::default(),
    };
    apply_flags(flags, &mut options);
    tracing::debug!(?options, "resolved diff options");
    Ok(options)
}

fn apply_flags(flags: &DiffFlags, options: &mut DiffOptions) {
    if let Some(n) = flags.unified {
        options.context_lines = n;
    }
    if let Some(n) = flags.inter_hunk_context {
        options.interhunk_lines = n;
    }
    if flags.ignore_all_space {
        options.whitespace = WhitespaceMode::All;
    } else if flags.ignore_space_change {
        options.whitespace = WhitespaceMode::Change;
    } else if flags.ignore_space_at_eol {
        options.whitespace = WhitespaceMode::Eol;
    }
    if flags.text {
        options.force_text = true;
    }
    if flags.reverse {
        options.reverse = true;
    }
    if let Some(prefix) = &flags.src_prefix {
        options.old_prefix = prefix.clone();
    }
    if let Some(prefix) = &flags.dst_prefix {
        options.new_prefix = prefix.clone();
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rift",
    about = "Rift: unified and status diffs between files and directory trees",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Diff two files
    Files(FilesArgs),
    /// Diff a stored snapshot of one directory against another directory
    Dirs(DirsArgs),
}

#[derive(Args)]
pub struct FilesArgs {
    /// Old file; a missing path is treated as an absent side
    pub old: PathBuf,
    /// New file; a missing path is treated as an absent side
    pub new: PathBuf,
    #[command(flatten)]
    pub diff: DiffFlags,
}

#[derive(Args)]
pub struct DirsArgs {
    /// Directory snapshotted into the object store as the old side
    pub old_dir: PathBuf,
    /// Directory read as the working tree
    pub new_dir: PathBuf,
    /// Show only status letters and paths
    #[arg(long, conflicts_with = "stat")]
    pub name_status: bool,
    /// Show file and line totals instead of a patch
    #[arg(long)]
    pub stat: bool,
    /// Attribute rules file (gitattributes syntax)
    #[arg(long, value_name = "FILE")]
    pub attributes: Option<PathBuf>,
    /// Include files that only exist in the new directory as untracked
    #[arg(long)]
    pub untracked: bool,
    #[command(flatten)]
    pub diff: DiffFlags,
}

/// Options shared by every diff command. Flags override the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct DiffFlags {
    /// Lines of context around each change
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub unified: Option<usize>,
    /// Unchanged lines allowed between changes before a hunk is split
    #[arg(long, value_name = "N")]
    pub inter_hunk_context: Option<usize>,
    /// Ignore all whitespace
    #[arg(short = 'w', long)]
    pub ignore_all_space: bool,
    /// Ignore changes in amount of whitespace
    #[arg(short = 'b', long)]
    pub ignore_space_change: bool,
    /// Ignore whitespace at end of line
    #[arg(long)]
    pub ignore_space_at_eol: bool,
    /// Treat all files as text
    #[arg(short = 'a', long)]
    pub text: bool,
    /// Swap the old and new sides
    #[arg(short = 'R')]
    pub reverse: bool,
    #[arg(long, value_name = "PREFIX")]
    pub src_prefix: Option<String>,
    #[arg(long, value_name = "PREFIX")]
    pub dst_prefix: Option<String>,
    /// TOML file with a [diff] table of default options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Colorize output
    #[arg(long)]
    pub color: bool,
}

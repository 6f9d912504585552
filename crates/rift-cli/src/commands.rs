use std::collections::BTreeMap;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use rift_diff::classify::sniff;
use rift_diff::loader::link_target_bytes;
use rift_diff::{
    AttributeRules, BinaryState, ChangeList, Delta, DeltaStatus, DiffOptions, FileDescriptor,
    PatchStats, Repository, Source,
};
use rift_store::{Blob, InMemoryObjectStore};
use rift_types::FileMode;
use walkdir::WalkDir;

use crate::cli::*;
use crate::config;
use crate::output::Printer;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Files(args) => cmd_files(args),
        Command::Dirs(args) => cmd_dirs(args),
    }
}

fn read_optional(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

fn cmd_files(args: FilesArgs) -> anyhow::Result<()> {
    colored::control::set_override(args.diff.color);
    let options = config::resolve(&args.diff)?;

    let old = read_optional(&args.old)?;
    let new = read_optional(&args.new)?;
    if old.is_none() && new.is_none() {
        anyhow::bail!(
            "neither {} nor {} exists",
            args.old.display(),
            args.new.display()
        );
    }

    let stdout = io::stdout();
    let mut printer = Printer::new(BufWriter::new(stdout.lock()), args.diff.color);
    write_files_patch(
        &args.old,
        old.as_deref(),
        &args.new,
        new.as_deref(),
        &options,
        &mut printer,
    )?;
    printer.finish()?;
    Ok(())
}

/// Render a two-file patch. The blob diff has no file event, so the
/// `---`/`+++` header and the binary check happen here.
fn write_files_patch<W: io::Write>(
    old_path: &Path,
    old: Option<&[u8]>,
    new_path: &Path,
    new: Option<&[u8]>,
    options: &DiffOptions,
    printer: &mut Printer<W>,
) -> anyhow::Result<()> {
    let ((old_path, old), (new_path, new)) = if options.reverse {
        ((new_path, new), (old_path, old))
    } else {
        ((old_path, old), (new_path, new))
    };
    if old == new {
        return Ok(());
    }

    let label = |path: &Path, content: Option<&[u8]>, prefix: &str| match content {
        Some(_) => format!("{prefix}{}", path.display()),
        None => "/dev/null".to_string(),
    };
    let old_label = label(old_path, old, &options.old_prefix);
    let new_label = label(new_path, new, &options.new_prefix);

    let binary = !options.force_text
        && [old, new]
            .into_iter()
            .flatten()
            .any(|content| sniff(content) == BinaryState::Binary);
    if binary {
        printer.write_raw(&format!("Binary files {old_label} and {new_label} differ\n"))?;
        return Ok(());
    }

    printer.write_raw(&format!("--- {old_label}\n+++ {new_label}\n"))?;
    // Sides are already in display order.
    let forward = DiffOptions {
        reverse: false,
        ..options.clone()
    };
    rift_diff::diff_contents(old, new, &forward, printer)?;
    Ok(())
}

fn cmd_dirs(args: DirsArgs) -> anyhow::Result<()> {
    colored::control::set_override(args.diff.color);
    let mut options = config::resolve(&args.diff)?;
    options.include_untracked |= args.untracked;

    let (old_dir, new_dir) = if options.reverse {
        (&args.new_dir, &args.old_dir)
    } else {
        (&args.old_dir, &args.new_dir)
    };
    let rules = match &args.attributes {
        Some(path) => AttributeRules::from_file(path)
            .with_context(|| format!("loading attributes {}", path.display()))?,
        None => AttributeRules::new(),
    };

    let mut list = build_change_list(old_dir, new_dir, options, rules, args.untracked)?;

    let stdout = io::stdout();
    let mut printer = Printer::new(BufWriter::new(stdout.lock()), args.diff.color);
    if args.stat {
        let stats = PatchStats::collect(&mut list)?;
        if !stats.is_empty() {
            printer.write_raw(&format!(" {}\n", stats.to_string().bold()))?;
        }
    } else if args.name_status {
        rift_diff::render_compact(&mut list, &mut printer)?;
    } else {
        rift_diff::render_patch(&mut list, &mut printer)?;
    }
    printer.finish()?;
    Ok(())
}

/// Snapshot `old_dir` into an in-memory store and describe `new_dir` as a
/// working tree, pairing entries by relative path.
fn build_change_list(
    old_dir: &Path,
    new_dir: &Path,
    options: DiffOptions,
    rules: AttributeRules,
    untracked: bool,
) -> anyhow::Result<ChangeList> {
    let store = Arc::new(InMemoryObjectStore::new());

    let mut old_entries = BTreeMap::new();
    for (rel, full) in walk(old_dir)? {
        let mode = file_mode(&full)?;
        let content = read_content(&full, mode)?;
        let oid = store.write_blob(&content)?;
        let desc = FileDescriptor::stored(rel.as_str(), mode, oid, content.len() as u64);
        old_entries.insert(rel, desc);
    }

    let mut new_entries = BTreeMap::new();
    for (rel, full) in walk(new_dir)? {
        let mode = file_mode(&full)?;
        let size = std::fs::symlink_metadata(&full)
            .with_context(|| format!("stat {}", full.display()))?
            .len();
        new_entries.insert(rel.clone(), (FileDescriptor::workdir(rel.as_str(), mode, size), full));
    }
    tracing::debug!(old = old_entries.len(), new = new_entries.len(), "scanned directories");

    let repo = Repository::new(store)
        .with_workdir(new_dir)
        .with_attributes(Arc::new(rules));
    let mut list = ChangeList::new(repo, options, Source::Tree, Source::Workdir);

    let mut paths: Vec<&String> = old_entries.keys().chain(new_entries.keys()).collect();
    paths.sort();
    paths.dedup();
    for path in paths {
        let delta = match (old_entries.get(path), new_entries.get(path)) {
            (Some(old), Some((new, full))) => {
                let mut new = new.clone();
                if old.mode != new.mode {
                    // A mode-only change must survive the content hash check.
                    new.oid = Blob::id_for(&read_content(full, new.mode)?);
                    new.valid_id = true;
                }
                Delta::modified(old.clone(), new)
            }
            (Some(old), None) => Delta::deleted(old.clone()),
            (None, Some((new, _))) => {
                let mut delta = Delta::added(new.clone());
                if untracked {
                    delta.status = DeltaStatus::Untracked;
                }
                delta
            }
            (None, None) => continue,
        };
        list.push(delta);
    }
    Ok(list)
}

/// Regular files and symlinks under `root`, keyed by `/`-separated relative
/// path. `.git` directories are skipped.
fn walk(root: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }
    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");
    for entry in walker {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        let file_type = entry.file_type();
        if !(file_type.is_file() || file_type.is_symlink()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((rel, entry.into_path()));
    }
    Ok(entries)
}

fn file_mode(path: &Path) -> anyhow::Result<FileMode> {
    let meta = std::fs::symlink_metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.file_type().is_symlink() {
        return Ok(FileMode::SYMLINK);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 != 0 {
            return Ok(FileMode::EXECUTABLE);
        }
    }
    Ok(FileMode::REGULAR)
}

fn read_content(path: &Path, mode: FileMode) -> anyhow::Result<Vec<u8>> {
    if mode.is_symlink() {
        let target =
            std::fs::read_link(path).with_context(|| format!("readlink {}", path.display()))?;
        return Ok(link_target_bytes(target));
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn patch_for(old: Option<&[u8]>, new: Option<&[u8]>, options: &DiffOptions) -> String {
        let mut printer = Printer::new(Vec::new(), false);
        write_files_patch(
            Path::new("x.txt"),
            old,
            Path::new("y.txt"),
            new,
            options,
            &mut printer,
        )
        .unwrap();
        String::from_utf8(printer.finish().unwrap()).unwrap()
    }

    #[test]
    fn files_patch_has_header_and_hunk() {
        let out = patch_for(Some(b"1\n2\n"), Some(b"1\n3\n"), &DiffOptions::default());
        assert_eq!(out, "--- a/x.txt\n+++ b/y.txt\n@@ -1,2 +1,2 @@\n 1\n-2\n+3\n");
    }

    #[test]
    fn files_patch_identical_is_silent() {
        assert_eq!(patch_for(Some(b"same\n"), Some(b"same\n"), &DiffOptions::default()), "");
    }

    #[test]
    fn files_patch_missing_side_is_dev_null() {
        let out = patch_for(None, Some(b"new\n"), &DiffOptions::default());
        assert!(out.starts_with("--- /dev/null\n+++ b/y.txt\n@@ -0,0 +1 @@\n+new\n"));
    }

    #[test]
    fn files_patch_reverse() {
        let options = DiffOptions {
            reverse: true,
            ..Default::default()
        };
        let out = patch_for(Some(b"old\n"), Some(b"new\n"), &options);
        assert_eq!(out, "--- a/y.txt\n+++ b/x.txt\n@@ -1 +1 @@\n-new\n+old\n");
    }

    #[test]
    fn files_patch_binary() {
        let out = patch_for(Some(b"\0bin"), Some(b"text\n"), &DiffOptions::default());
        assert_eq!(out, "Binary files a/x.txt and b/y.txt differ\n");
    }

    #[test]
    fn dirs_change_list() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        fs::write(old.path().join("kept.txt"), b"same\n").unwrap();
        fs::write(new.path().join("kept.txt"), b"same\n").unwrap();
        fs::write(old.path().join("edited.txt"), b"before\n").unwrap();
        fs::write(new.path().join("edited.txt"), b"after\n").unwrap();
        fs::write(old.path().join("removed.txt"), b"x\n").unwrap();
        fs::create_dir(new.path().join("sub")).unwrap();
        fs::write(new.path().join("sub/added.txt"), b"y\n").unwrap();
        fs::create_dir(new.path().join(".git")).unwrap();
        fs::write(new.path().join(".git/HEAD"), b"ref\n").unwrap();

        let mut list = build_change_list(
            old.path(),
            new.path(),
            DiffOptions::default(),
            AttributeRules::new(),
            false,
        )
        .unwrap();
        assert_eq!(list.len(), 4);
        let listing = rift_diff::render_compact_to_string(&mut list).unwrap();
        assert_eq!(listing, "M\tedited.txt\nD\tremoved.txt\nA\tsub/added.txt\n");
    }

    #[cfg(unix)]
    #[test]
    fn dirs_mode_only_change_is_reported() {
        use std::os::unix::fs::PermissionsExt;
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        fs::write(old.path().join("run.sh"), b"echo\n").unwrap();
        fs::write(new.path().join("run.sh"), b"echo\n").unwrap();
        fs::set_permissions(new.path().join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();

        let mut list = build_change_list(
            old.path(),
            new.path(),
            DiffOptions::default(),
            AttributeRules::new(),
            false,
        )
        .unwrap();
        let listing = rift_diff::render_compact_to_string(&mut list).unwrap();
        assert_eq!(listing, "M\trun.sh (100644 -> 100755)\n");
    }

    #[cfg(unix)]
    #[test]
    fn dirs_non_utf8_symlink_target_is_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        let target = OsStr::from_bytes(b"caf\xe9/target");
        std::os::unix::fs::symlink(target, old.path().join("link")).unwrap();
        std::os::unix::fs::symlink(target, new.path().join("link")).unwrap();

        let mut list = build_change_list(
            old.path(),
            new.path(),
            DiffOptions::default(),
            AttributeRules::new(),
            false,
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(rift_diff::render_compact_to_string(&mut list).unwrap(), "");
        assert_eq!(list.deltas()[0].status, DeltaStatus::Unmodified);
    }

    #[test]
    fn dirs_untracked_flag() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        fs::write(new.path().join("fresh"), b"z\n").unwrap();
        let options = DiffOptions {
            include_untracked: true,
            ..Default::default()
        };
        let mut list = build_change_list(
            old.path(),
            new.path(),
            options,
            AttributeRules::new(),
            true,
        )
        .unwrap();
        assert_eq!(list.deltas()[0].status, DeltaStatus::Untracked);
        assert_eq!(rift_diff::render_compact_to_string(&mut list).unwrap(), "?\tfresh\n");
    }

    #[test]
    fn walk_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"").unwrap();
        assert!(walk(&file).is_err());
    }
}

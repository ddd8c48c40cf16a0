//! Source tree enumeration.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Collect regular files under `root` whose names end with one of `suffixes`.
///
/// Descent is unbounded and does not follow symlinks. Paths come back
/// absolute, ordered by file name within each directory. Entries that cannot
/// be read are logged and skipped.
pub fn find_files_by_suffix(root: &Path, suffixes: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("source root {} is not a directory", root.display());
    }
    let root = fs::canonicalize(root)
        .with_context(|| format!("resolving source root {}", root.display()))?;

    let mut found = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), "skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_suffix(&entry.file_name().to_string_lossy(), suffixes) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

fn has_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

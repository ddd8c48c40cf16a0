//! Group ownership propagation over filed directories.
//!
//! Runs once, after every placement, over the final directory registry. Each
//! registry root is walked recursively and every directory and file found is
//! handed to the configured group; the owning user is left alone. Symlinks
//! are re-grouped themselves and never followed.

use anyhow::Result;
use serde::Serialize;

#[cfg(unix)]
use crate::registry::DirectoryRegistry;
#[cfg(unix)]
use anyhow::{Context, bail};
#[cfg(unix)]
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipSummary {
    pub group: String,
    pub gid: u32,
    /// Paths whose group was set.
    pub changed: usize,
    pub failures: usize,
}

/// Resolve a group name (or numeric id) through the system group database.
#[cfg(unix)]
pub fn resolve_group(group: &str) -> Result<u32> {
    if let Ok(gid) = group.parse::<u32>() {
        return Ok(gid);
    }
    let name = std::ffi::CString::new(group)
        .with_context(|| format!("group name {group:?} contains a NUL byte"))?;
    // getgrnam hands back static storage; propagation runs on a single thread.
    let entry = unsafe { libc::getgrnam(name.as_ptr()) };
    if entry.is_null() {
        bail!("unknown group '{group}'");
    }
    Ok(unsafe { (*entry).gr_gid })
}

/// Re-group everything under the registry roots. Per-path failures are
/// counted and logged, never fatal; only an unknown group is an error.
#[cfg(unix)]
pub fn propagate_group(registry: &DirectoryRegistry, group: &str) -> Result<OwnershipSummary> {
    use std::os::unix::fs::lchown;
    use walkdir::WalkDir;

    let gid = resolve_group(group)?;
    let mut summary = OwnershipSummary {
        group: group.to_string(),
        gid,
        ..OwnershipSummary::default()
    };

    for root in registry.roots() {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    summary.failures += 1;
                    warn!(root = %root.display(), "unable to walk for ownership: {err}");
                    continue;
                }
            };
            match lchown(entry.path(), None, Some(gid)) {
                Ok(()) => {
                    summary.changed += 1;
                    debug!(path = %entry.path().display(), gid, "group set");
                }
                Err(err) => {
                    summary.failures += 1;
                    warn!(path = %entry.path().display(), gid, "unable to set group: {err}");
                }
            }
        }
    }
    Ok(summary)
}

#[cfg(not(unix))]
pub fn propagate_group(
    _registry: &crate::registry::DirectoryRegistry,
    group: &str,
) -> Result<OwnershipSummary> {
    anyhow::bail!("group propagation to '{group}' requires a unix host")
}

//! Run-scoped set of directories the filer touched.
//!
//! Every directory the resolver creates or finds already present is recorded
//! here, once, in first-seen order. The final set feeds the ownership pass.

use indexmap::IndexSet;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
pub struct DirectoryRegistry {
    dirs: IndexSet<PathBuf>,
}

impl DirectoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory; returns false when it was already present.
    pub fn record(&mut self, dir: impl Into<PathBuf>) -> bool {
        self.dirs.insert(dir.into())
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Directories in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Entries that are not nested under another entry.
    ///
    /// A recursive walk from each root covers the whole registry exactly once.
    pub fn roots(&self) -> Vec<&Path> {
        self.iter()
            .filter(|dir| {
                !self
                    .dirs
                    .iter()
                    .any(|other| other.as_path() != *dir && dir.starts_with(other))
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.dirs.into_iter().collect()
    }
}

//! Destination hierarchy resolution.
//!
//! Turns a decoded file name into `<dest>/<org>/<sub>/<doc>/<remainder>`,
//! creating the three directory levels top-down as needed. The organization
//! and sub-unit are looked up and materialized before the document type is
//! searched, so an unknown document-type code leaves the two resolved
//! ancestors on disk (and in the registry) for later files. An unknown
//! organization or sub-unit code creates nothing. Nothing is rolled back: a
//! creation failure stops at the failing level and shallower levels stay.

use crate::catalog::{CatalogEntry, CatalogIndex, CatalogLevel};
use crate::error::FilingError;
use crate::filename::FilenameToken;
use crate::registry::DirectoryRegistry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fully resolved destination for one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    pub org_dir: PathBuf,
    pub sub_dir: PathBuf,
    pub doc_dir: PathBuf,
    pub dest_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Resolution {
    pub path: ResolvedPath,
    /// Directories this resolution created, outermost first.
    pub created: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    Existing,
}

/// Create `path` unless it is already a directory.
///
/// Non-recursive: the parent must exist. A concurrent creator winning the
/// race counts as `Existing`.
pub fn ensure_dir(path: &Path) -> io::Result<DirStatus> {
    if path.is_dir() {
        return Ok(DirStatus::Existing);
    }
    match fs::create_dir(path) {
        Ok(()) => Ok(DirStatus::Created),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
            Ok(DirStatus::Existing)
        }
        Err(err) => Err(err),
    }
}

pub struct Resolver<'a> {
    index: &'a CatalogIndex,
    dest_root: &'a Path,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a CatalogIndex, dest_root: &'a Path) -> Self {
        Self { index, dest_root }
    }

    pub fn dest_root(&self) -> &Path {
        self.dest_root
    }

    /// Resolve `token` and materialize its directories, recording each one.
    pub fn resolve(
        &self,
        token: &FilenameToken,
        registry: &mut DirectoryRegistry,
    ) -> Result<Resolution, FilingError> {
        let mut created = Vec::new();
        let path = self.resolve_into(token, registry, &mut created)?;
        Ok(Resolution { path, created })
    }

    /// As `resolve`, but newly created directories are pushed onto `created`
    /// even when resolution fails part-way.
    pub fn resolve_into(
        &self,
        token: &FilenameToken,
        registry: &mut DirectoryRegistry,
        created: &mut Vec<PathBuf>,
    ) -> Result<ResolvedPath, FilingError> {
        let org = self.index.require(CatalogLevel::Organization, &token.org_code)?;
        let sub = self.index.require(CatalogLevel::SubUnit, &token.sub_code)?;

        let org_dir = materialize(
            self.dest_root,
            (CatalogLevel::Organization, org),
            registry,
            created,
        )?;
        let sub_dir = materialize(&org_dir, (CatalogLevel::SubUnit, sub), registry, created)?;

        let doc = self
            .index
            .require(CatalogLevel::DocumentType, &token.doc_code)?;
        let doc_dir = materialize(
            &sub_dir,
            (CatalogLevel::DocumentType, doc),
            registry,
            created,
        )?;

        let dest_file = doc_dir.join(&token.remainder);
        Ok(ResolvedPath {
            org_dir,
            sub_dir,
            doc_dir,
            dest_file,
        })
    }
}

fn materialize(
    parent: &Path,
    (level, entry): (CatalogLevel, &CatalogEntry),
    registry: &mut DirectoryRegistry,
    created: &mut Vec<PathBuf>,
) -> Result<PathBuf, FilingError> {
    // The index only holds rows with both display fields.
    let Some(name) = entry.dir_name() else {
        return Err(FilingError::UnresolvedCode {
            level,
            code: entry.code.clone(),
        });
    };
    let dir = parent.join(&name);
    if name.chars().any(std::path::is_separator) {
        return Err(FilingError::DirectoryCreationFailed {
            path: dir,
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{level} directory name '{name}' contains a path separator"),
            ),
        });
    }
    match ensure_dir(&dir) {
        Ok(DirStatus::Created) => {
            info!(dir = %dir.display(), "created directory");
            created.push(dir.clone());
        }
        Ok(DirStatus::Existing) => {
            debug!(dir = %dir.display(), "directory exists");
        }
        Err(source) => {
            return Err(FilingError::DirectoryCreationFailed { path: dir, source });
        }
    }
    registry.record(dir.clone());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogTables;
    use crate::filename::decode;
    use tempfile::TempDir;

    fn index() -> CatalogIndex {
        CatalogIndex::build(&CatalogTables {
            organizations: vec![CatalogEntry::new("c01", "C1", "Alpha ")],
            sub_units: vec![
                CatalogEntry::new("sub", "S1", "Beta"),
                CatalogEntry::new("bad", "S9", "Slash/Name"),
            ],
            document_types: vec![CatalogEntry::new("abc", "D1", "Gamma")],
        })
    }

    #[test]
    fn creates_three_levels_and_records_them() {
        let dest = TempDir::new().unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();

        let token = decode("c01sub_abc_Report.pdf").unwrap();
        let resolution = resolver.resolve(&token, &mut registry).unwrap();

        let org = dest.path().join("C1 - Alpha");
        let sub = org.join("S1 - Beta");
        let doc = sub.join("D1 - Gamma");
        assert_eq!(resolution.path.org_dir, org);
        assert_eq!(resolution.path.sub_dir, sub);
        assert_eq!(resolution.path.doc_dir, doc);
        assert_eq!(resolution.path.dest_file, doc.join("Report.pdf"));
        assert!(doc.is_dir());
        assert_eq!(resolution.created, vec![org.clone(), sub.clone(), doc.clone()]);
        assert_eq!(registry.clone().into_vec(), vec![org, sub, doc]);
    }

    #[test]
    fn second_resolution_creates_nothing() {
        let dest = TempDir::new().unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();
        let token = decode("c01sub_abc_Report.pdf").unwrap();

        resolver.resolve(&token, &mut registry).unwrap();
        let again = resolver.resolve(&token, &mut registry).unwrap();
        assert!(again.created.is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unknown_document_type_keeps_resolved_ancestors() {
        let dest = TempDir::new().unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();
        let mut created = Vec::new();

        let token = decode("c01sub_zzz_Report.pdf").unwrap();
        match resolver.resolve_into(&token, &mut registry, &mut created) {
            Err(FilingError::UnresolvedCode { level, code }) => {
                assert_eq!(level, CatalogLevel::DocumentType);
                assert_eq!(code, "zzz");
            }
            other => panic!("expected unresolved document type, got {other:?}"),
        }

        let org = dest.path().join("C1 - Alpha");
        let sub = org.join("S1 - Beta");
        assert!(sub.is_dir());
        assert_eq!(fs::read_dir(&sub).unwrap().count(), 0);
        assert_eq!(created, vec![org.clone(), sub.clone()]);
        assert_eq!(registry.into_vec(), vec![org, sub]);
    }

    #[test]
    fn unknown_organization_or_sub_unit_creates_nothing() {
        let dest = TempDir::new().unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();

        for (name, failing) in [
            ("zzzsub_abc_Report.pdf", CatalogLevel::Organization),
            ("c01zzz_abc_Report.pdf", CatalogLevel::SubUnit),
        ] {
            let token = decode(name).unwrap();
            match resolver.resolve(&token, &mut registry) {
                Err(FilingError::UnresolvedCode { level, .. }) => assert_eq!(level, failing),
                other => panic!("expected unresolved {failing}, got {other:?}"),
            }
        }
        assert!(registry.is_empty());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn separator_in_display_name_fails_below_existing_levels() {
        let dest = TempDir::new().unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();

        let token = decode("c01bad_abc_Report.pdf").unwrap();
        let err = resolver.resolve(&token, &mut registry).unwrap_err();
        assert!(matches!(err, FilingError::DirectoryCreationFailed { .. }));
        // The organization level resolved and stays on disk.
        assert!(dest.path().join("C1 - Alpha").is_dir());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn existing_file_in_place_of_directory_fails_creation() {
        let dest = TempDir::new().unwrap();
        fs::write(dest.path().join("C1 - Alpha"), b"not a directory").unwrap();
        let index = index();
        let resolver = Resolver::new(&index, dest.path());
        let mut registry = DirectoryRegistry::new();

        let token = decode("c01sub_abc_Report.pdf").unwrap();
        match resolver.resolve(&token, &mut registry) {
            Err(FilingError::DirectoryCreationFailed { path, .. }) => {
                assert_eq!(path, dest.path().join("C1 - Alpha"));
            }
            other => panic!("expected mkdir failure, got {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn ensure_dir_reports_existing() {
        let dest = TempDir::new().unwrap();
        let dir = dest.path().join("x");
        assert_eq!(ensure_dir(&dir).unwrap(), DirStatus::Created);
        assert_eq!(ensure_dir(&dir).unwrap(), DirStatus::Existing);
        assert!(ensure_dir(&dest.path().join("missing/child")).is_err());
    }
}

#![allow(dead_code)]

use anyhow::{Context, Result};
use docfiler::{CatalogEntry, CatalogTables, write_snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Catalog used across the integration suites. `x01` has no display fields and
// `C02` exists only with an upper-case sub-unit code.
pub fn sample_tables() -> CatalogTables {
    CatalogTables {
        organizations: vec![
            CatalogEntry::new("c01", "C1", "Alpha"),
            CatalogEntry::new("c02", "C2", "Complex One "),
            CatalogEntry::new("c01", "C9", "Shadowed"),
            CatalogEntry {
                code: "x01".to_string(),
                display_code: None,
                display_name: None,
            },
        ],
        sub_units: vec![
            CatalogEntry::new("sub", "S1", "Beta"),
            CatalogEntry::new("SUB", "S2", "Upper"),
        ],
        document_types: vec![
            CatalogEntry::new("abc", "D1", "Gamma"),
            CatalogEntry::new("inv", "D2", "Invoices"),
        ],
    }
}

/// Write `sample_tables` as a snapshot under `dir`.
pub fn write_sample_catalog(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("catalog.json");
    write_snapshot(&path, &sample_tables())?;
    Ok(path)
}

pub fn write_source(root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating fixture dir {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("writing fixture {}", path.display()))?;
    Ok(path)
}

/// Every path under `root`, relative and sorted, directories with a trailing `/`.
pub fn tree(root: &Path) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root)?.to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            entries.push(format!("{relative}/"));
        } else {
            entries.push(relative);
        }
    }
    Ok(entries)
}

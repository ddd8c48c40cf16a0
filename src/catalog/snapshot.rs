//! JSON snapshot of the catalog tables.
//!
//! A snapshot lets the filer run without database access (and gives tests a
//! catalog to work against). Documents are validated against the embedded
//! `schema/catalog_snapshot.schema.json` before they are deserialized, so a
//! malformed export is rejected with every violation listed.

use crate::catalog::{CatalogSource, CatalogTables};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Version marker every snapshot document carries.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "docfiler_catalog_v1";

const SNAPSHOT_SCHEMA: &str = include_str!("../../schema/catalog_snapshot.schema.json");

#[derive(Debug, Deserialize, Serialize)]
struct SnapshotDocument {
    schema_version: String,
    #[serde(flatten)]
    tables: CatalogTables,
}

/// Catalog source backed by a snapshot file on disk.
#[derive(Clone, Debug)]
pub struct SnapshotCatalog {
    path: PathBuf,
}

impl SnapshotCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for SnapshotCatalog {
    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }

    fn load(&self) -> Result<CatalogTables> {
        load_snapshot(&self.path)
    }
}

pub fn load_snapshot(path: &Path) -> Result<CatalogTables> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading catalog snapshot {}", path.display()))?;
    parse_snapshot(&data).with_context(|| format!("parsing catalog snapshot {}", path.display()))
}

/// Validate and deserialize a snapshot document.
pub fn parse_snapshot(data: &str) -> Result<CatalogTables> {
    let value: Value = serde_json::from_str(data).context("snapshot is not valid JSON")?;
    validate_snapshot(&value)?;
    let document: SnapshotDocument =
        serde_json::from_value(value).context("snapshot does not match catalog tables")?;
    if document.schema_version != SNAPSHOT_SCHEMA_VERSION {
        bail!(
            "unsupported snapshot schema_version '{}', expected {}",
            document.schema_version,
            SNAPSHOT_SCHEMA_VERSION
        );
    }
    Ok(document.tables)
}

/// Write `tables` as a snapshot document (pretty-printed).
pub fn write_snapshot(path: &Path, tables: &CatalogTables) -> Result<()> {
    let document = SnapshotDocument {
        schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
        tables: tables.clone(),
    };
    let json = serde_json::to_string_pretty(&document).context("serializing catalog snapshot")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("writing catalog snapshot {}", path.display()))
}

fn validate_snapshot(value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(SNAPSHOT_SCHEMA).context("parsing embedded snapshot schema")?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling embedded snapshot schema: {err}"))?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| format!("{} at {}", err, err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("snapshot failed schema validation:\n{}", details);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn parses_tables_in_catalog_order() {
        let doc = json!({
            "schema_version": SNAPSHOT_SCHEMA_VERSION,
            "organizations": [
                {"code": "c01", "display_code": "C1", "display_name": "Alpha"},
                {"code": "c02", "display_code": "C2", "display_name": null}
            ],
            "sub_units": [{"code": "sub", "display_code": "S1", "display_name": "Beta"}],
            "document_types": [{"code": "abc"}]
        });
        let tables = parse_snapshot(&doc.to_string()).unwrap();
        assert_eq!(tables.organizations.len(), 2);
        assert_eq!(tables.organizations[0], CatalogEntry::new("c01", "C1", "Alpha"));
        assert_eq!(tables.organizations[1].display_name, None);
        assert_eq!(tables.document_types[0].display_code, None);
    }

    #[test]
    fn schema_violations_are_listed() {
        let doc = json!({
            "schema_version": SNAPSHOT_SCHEMA_VERSION,
            "organizations": [{"display_code": "C1"}],
            "sub_units": [],
            "document_types": [],
            "extra": true
        });
        let err = parse_snapshot(&doc.to_string()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("schema validation"), "{message}");
        assert!(message.contains("code"), "{message}");
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let doc = json!({
            "schema_version": "docfiler_catalog_v0",
            "organizations": [],
            "sub_units": [],
            "document_types": []
        });
        assert!(parse_snapshot(&doc.to_string()).is_err());
    }

    #[test]
    fn written_snapshot_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");
        let tables = CatalogTables {
            organizations: vec![CatalogEntry::new("c01", "C1", "Alpha")],
            sub_units: vec![CatalogEntry::new("sub", "S1", "Beta")],
            document_types: vec![CatalogEntry::new("abc", "D1", "Gamma")],
        };
        write_snapshot(&path, &tables).unwrap();

        let source = SnapshotCatalog::new(&path);
        assert!(source.describe().contains("catalog.json"));
        let loaded = source.load().unwrap();
        assert_eq!(loaded.sub_units, tables.sub_units);
    }
}

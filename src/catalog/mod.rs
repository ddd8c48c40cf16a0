//! Catalog tables wiring.
//!
//! The catalog names every filing location: organizations, their sub-units,
//! and document types, each keyed by a three-character code. Sources (the
//! PostgreSQL catalog or a JSON snapshot of it) load a `CatalogTables` value
//! once per run; callers use `CatalogIndex` for the per-level lookups.

pub mod index;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod snapshot;

pub use index::CatalogIndex;
#[cfg(feature = "postgres")]
pub use postgres::{PgCatalog, PgConnectionParams};
pub use snapshot::SnapshotCatalog;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port used for the catalog database when none is given.
pub const DEFAULT_PG_PORT: u16 = 5432;

/// Separator between display code and display name in directory names.
pub const DIR_NAME_SEPARATOR: &str = " - ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogLevel {
    Organization,
    SubUnit,
    DocumentType,
}

impl CatalogLevel {
    /// Levels in nesting order, outermost first.
    pub const ALL: [CatalogLevel; 3] = [
        CatalogLevel::Organization,
        CatalogLevel::SubUnit,
        CatalogLevel::DocumentType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogLevel::Organization => "organization",
            CatalogLevel::SubUnit => "sub-unit",
            CatalogLevel::DocumentType => "document-type",
        }
    }
}

impl fmt::Display for CatalogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog row.
///
/// `display_code` and `display_name` are optional because catalog rows exist
/// before anyone assigns them a filing location; such rows never match.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub code: String,
    #[serde(default)]
    pub display_code: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl CatalogEntry {
    pub fn new(code: &str, display_code: &str, display_name: &str) -> Self {
        Self {
            code: code.to_string(),
            display_code: Some(display_code.to_string()),
            display_name: Some(display_name.to_string()),
        }
    }

    /// True when the row carries both display fields and can name a directory.
    pub fn is_fileable(&self) -> bool {
        non_blank(self.display_code.as_deref()) && non_blank(self.display_name.as_deref())
    }

    /// Directory name for this row: `"<display code> - <display name>"`.
    ///
    /// Trailing whitespace is trimmed from each field before joining; catalog
    /// columns are often fixed-width and space padded.
    pub fn dir_name(&self) -> Option<String> {
        if !self.is_fileable() {
            return None;
        }
        let code = self.display_code.as_deref()?.trim_end();
        let name = self.display_name.as_deref()?.trim_end();
        Some(format!("{code}{DIR_NAME_SEPARATOR}{name}"))
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// The three catalog tables as loaded from a source, in catalog order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogTables {
    pub organizations: Vec<CatalogEntry>,
    pub sub_units: Vec<CatalogEntry>,
    pub document_types: Vec<CatalogEntry>,
}

impl CatalogTables {
    pub fn table(&self, level: CatalogLevel) -> &[CatalogEntry] {
        match level {
            CatalogLevel::Organization => &self.organizations,
            CatalogLevel::SubUnit => &self.sub_units,
            CatalogLevel::DocumentType => &self.document_types,
        }
    }

    pub fn is_empty(&self) -> bool {
        CatalogLevel::ALL
            .iter()
            .all(|level| self.table(*level).is_empty())
    }
}

/// Anything that can produce the catalog tables for a run.
pub trait CatalogSource {
    /// Human-readable origin for logs (never includes credentials).
    fn describe(&self) -> String;

    fn load(&self) -> Result<CatalogTables>;
}

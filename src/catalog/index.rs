//! Indexed view of the catalog tables.
//!
//! One map per level replaces scanning the tables for every file. The index
//! encodes the two matching rules of the filing scheme explicitly:
//!
//! * first match wins: when a table repeats a code, the row that appears
//!   first in catalog order is the one used, later rows are ignored;
//! * organization and sub-unit codes match exactly, document-type codes
//!   match case-insensitively (both sides lower-cased).
//!
//! Rows without display fields are left out entirely.

use crate::catalog::{CatalogEntry, CatalogLevel, CatalogTables};
use crate::error::FilingError;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// Per-level lookup tables keyed by matching code.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    organizations: BTreeMap<String, CatalogEntry>,
    sub_units: BTreeMap<String, CatalogEntry>,
    document_types: BTreeMap<String, CatalogEntry>,
}

impl CatalogIndex {
    /// Build the index from loaded tables, keeping the first row per code.
    pub fn build(tables: &CatalogTables) -> Self {
        let mut index = CatalogIndex::default();
        for level in CatalogLevel::ALL {
            let map = index.map_mut(level);
            for entry in tables.table(level) {
                if !entry.is_fileable() {
                    continue;
                }
                let key = match_key(level, &entry.code).into_owned();
                if let Some(kept) = map.get(&key) {
                    debug!(
                        level = %level,
                        code = %entry.code,
                        kept = ?kept.display_name,
                        ignored = ?entry.display_name,
                        "duplicate catalog code; keeping first row"
                    );
                    continue;
                }
                map.insert(key, entry.clone());
            }
        }
        index
    }

    /// Find the row for `code` at `level`, applying that level's case rule.
    pub fn lookup(&self, level: CatalogLevel, code: &str) -> Option<&CatalogEntry> {
        let key = match_key(level, code);
        self.map(level).get(&*key)
    }

    /// Like `lookup`, but an unknown code is an `UnresolvedCode` error.
    pub fn require(&self, level: CatalogLevel, code: &str) -> Result<&CatalogEntry, FilingError> {
        self.lookup(level, code)
            .ok_or_else(|| FilingError::UnresolvedCode {
                level,
                code: code.to_string(),
            })
    }

    /// Number of matchable rows at `level`.
    pub fn len(&self, level: CatalogLevel) -> usize {
        self.map(level).len()
    }

    pub fn is_empty(&self) -> bool {
        CatalogLevel::ALL.iter().all(|level| self.len(*level) == 0)
    }

    fn map(&self, level: CatalogLevel) -> &BTreeMap<String, CatalogEntry> {
        match level {
            CatalogLevel::Organization => &self.organizations,
            CatalogLevel::SubUnit => &self.sub_units,
            CatalogLevel::DocumentType => &self.document_types,
        }
    }

    fn map_mut(&mut self, level: CatalogLevel) -> &mut BTreeMap<String, CatalogEntry> {
        match level {
            CatalogLevel::Organization => &mut self.organizations,
            CatalogLevel::SubUnit => &mut self.sub_units,
            CatalogLevel::DocumentType => &mut self.document_types,
        }
    }
}

fn match_key(level: CatalogLevel, code: &str) -> Cow<'_, str> {
    match level {
        CatalogLevel::DocumentType => Cow::Owned(code.to_lowercase()),
        CatalogLevel::Organization | CatalogLevel::SubUnit => Cow::Borrowed(code),
    }
}

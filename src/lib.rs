//! Catalog-driven document filing.
//!
//! Source documents named `<org><sub>_<doc>_<rest>` are copied into
//! `<dest>/<org dir>/<sub dir>/<doc dir>/<rest>`, where each directory name
//! comes from the catalog row for the matching code. The pipeline is:
//! scan the source tree ([`find_files_by_suffix`]), load a catalog
//! ([`CatalogSource`]), index it ([`CatalogIndex`]), then let a [`Filer`]
//! decode, resolve and place each file. The registry of touched directories
//! feeds a final group-ownership pass ([`propagate_group`]).

pub mod catalog;
pub mod config;
pub mod error;
pub mod filename;
pub mod filer;
pub mod ownership;
pub mod placement;
pub mod registry;
pub mod resolve;
pub mod scan;

pub use catalog::snapshot::{load_snapshot, parse_snapshot, write_snapshot};
pub use catalog::{
    CatalogEntry, CatalogIndex, CatalogLevel, CatalogSource, CatalogTables, SnapshotCatalog,
};
pub use config::{CatalogConfig, CliArgs, FilerConfig};
pub use error::FilingError;
pub use filename::{FilenameToken, decode, decode_path};
pub use filer::{FileOutcome, FileRecord, Filed, Filer, RunReport, RunSummary};
pub use ownership::{OwnershipSummary, propagate_group};
pub use placement::{Placement, place};
pub use registry::DirectoryRegistry;
pub use resolve::{ResolvedPath, Resolver};
pub use scan::find_files_by_suffix;

/// Split a comma- or whitespace-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

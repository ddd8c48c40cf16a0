//! Run configuration.
//!
//! `CliArgs` is the command-line surface; `FilerConfig::from_cli` validates it
//! once (directories exist, suffixes are usable, exactly one catalog source)
//! and everything downstream takes the validated `FilerConfig` by reference.

use crate::catalog::{CatalogSource, DEFAULT_PG_PORT, SnapshotCatalog};
#[cfg(feature = "postgres")]
use crate::catalog::{PgCatalog, PgConnectionParams};
use crate::split_list;
use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "docfiler", version)]
#[command(about = "File coded documents into the catalog directory tree")]
#[command(group(
    ArgGroup::new("catalog")
        .required(true)
        .args(["catalog_file", "db_name"])
))]
pub struct CliArgs {
    /// Directory tree to scan for documents.
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,
    /// Root of the destination hierarchy.
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,
    /// File-name suffix to pick up (repeatable, comma-separated lists allowed).
    #[arg(long = "ext", value_name = "SUFFIX")]
    pub ext: Vec<String>,
    /// Additional suffixes given positionally.
    #[arg(value_name = "EXT")]
    pub extensions: Vec<String>,
    /// Load the catalog from a JSON snapshot instead of the database.
    #[arg(long, value_name = "FILE")]
    pub catalog_file: Option<PathBuf>,
    /// Catalog database name.
    #[arg(long, value_name = "NAME", requires = "db_user")]
    pub db_name: Option<String>,
    #[arg(long, value_name = "USER")]
    pub db_user: Option<String>,
    /// Catalog database password.
    #[arg(long, value_name = "PASSWORD", env = "DOCFILER_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
    #[arg(long, value_name = "HOST", default_value = "localhost")]
    pub db_host: String,
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_PG_PORT)]
    pub db_port: u16,
    /// Group to hand filed directories to once every file is placed.
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,
    /// Write a JSON run report to this path.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
    /// Also write the loaded catalog as a JSON snapshot.
    #[arg(long, value_name = "FILE")]
    pub export_catalog: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub enum CatalogConfig {
    Snapshot(PathBuf),
    #[cfg(feature = "postgres")]
    Postgres(PgConnectionParams),
}

impl CatalogConfig {
    pub fn source(&self) -> Box<dyn CatalogSource> {
        match self {
            CatalogConfig::Snapshot(path) => Box::new(SnapshotCatalog::new(path)),
            #[cfg(feature = "postgres")]
            CatalogConfig::Postgres(params) => Box::new(PgCatalog::new(params.clone())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FilerConfig {
    /// Canonical, absolute source root.
    pub source_root: PathBuf,
    /// Canonical, absolute destination root.
    pub dest_root: PathBuf,
    pub suffixes: Vec<String>,
    pub catalog: CatalogConfig,
    pub group: Option<String>,
    pub report_path: Option<PathBuf>,
    pub export_catalog: Option<PathBuf>,
}

impl FilerConfig {
    pub fn from_cli(args: CliArgs) -> Result<Self> {
        let source_root = existing_dir(&args.source, "source")?;
        let dest_root = existing_dir(&args.dest, "destination")?;
        if dest_root.starts_with(&source_root) {
            bail!(
                "destination {} must not be inside the source tree {}",
                dest_root.display(),
                source_root.display()
            );
        }

        let suffixes = normalize_suffixes(args.ext.iter().chain(args.extensions.iter()));
        if suffixes.is_empty() {
            bail!("at least one file suffix is required (--ext or trailing EXT arguments)");
        }

        let catalog = match (args.catalog_file, args.db_name) {
            (Some(path), None) => CatalogConfig::Snapshot(path),
            (None, Some(dbname)) => postgres_config(
                dbname,
                args.db_user.unwrap_or_default(),
                args.db_password.filter(|p| !p.is_empty()),
                args.db_host,
                args.db_port,
            )?,
            (Some(_), Some(_)) => bail!("--catalog-file and --db-name are mutually exclusive"),
            (None, None) => bail!("a catalog source is required (--catalog-file or --db-name)"),
        };

        if let Some(group) = args.group.as_deref() {
            if group.trim().is_empty() {
                bail!("--group must not be empty");
            }
        }

        Ok(Self {
            source_root,
            dest_root,
            suffixes,
            catalog,
            group: args.group,
            report_path: args.report,
            export_catalog: args.export_catalog,
        })
    }
}

#[cfg(feature = "postgres")]
fn postgres_config(
    dbname: String,
    user: String,
    password: Option<String>,
    host: String,
    port: u16,
) -> Result<CatalogConfig> {
    if user.is_empty() {
        bail!("--db-user must not be empty");
    }
    Ok(CatalogConfig::Postgres(PgConnectionParams {
        host,
        port,
        dbname,
        user,
        password,
    }))
}

#[cfg(not(feature = "postgres"))]
fn postgres_config(
    dbname: String,
    _user: String,
    _password: Option<String>,
    _host: String,
    _port: u16,
) -> Result<CatalogConfig> {
    bail!("database catalog '{dbname}' requested but docfiler was built without the postgres feature")
}

fn existing_dir(path: &Path, role: &str) -> Result<PathBuf> {
    if !path.is_dir() {
        bail!("{role} {} is not an existing directory", path.display());
    }
    fs::canonicalize(path).with_context(|| format!("resolving {role} {}", path.display()))
}

/// Flatten suffix arguments, splitting comma lists and dropping duplicates.
pub fn normalize_suffixes<'a>(raw: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut suffixes: Vec<String> = Vec::new();
    for value in raw {
        for suffix in split_list(value) {
            if !suffixes.contains(&suffix) {
                suffixes.push(suffix);
            }
        }
    }
    suffixes
}

//! Command-line entry point for the document filer.
//!
//! Usage:
//!   docfiler --source /srv/inbox --dest /srv/archive --catalog-file catalog.json .pdf .doc
//!   docfiler --source /srv/inbox --dest /srv/archive --db-name gcddb --db-user filer \
//!            --group archive --report run.json --ext .pdf,.doc
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `docfiler=info`). The
//! exit status is non-zero when any file failed, the catalog could not be
//! loaded, or group propagation hit errors.

use anyhow::{Context, Result};
use clap::Parser;
use docfiler::{
    CatalogIndex, CatalogLevel, CatalogTables, CliArgs, Filer, FilerConfig, FilingError,
    find_files_by_suffix, propagate_group, write_snapshot,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "docfiler=info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Returns whether the run was clean.
fn run() -> Result<bool> {
    init_logging();
    let config = FilerConfig::from_cli(CliArgs::parse())?;

    let files = find_files_by_suffix(&config.source_root, &config.suffixes)?;
    info!(
        count = files.len(),
        source = %config.source_root.display(),
        suffixes = ?config.suffixes,
        "found files"
    );

    let source = config.catalog.source();
    let (tables, catalog_error) = match source.load() {
        Ok(tables) => (tables, None),
        Err(err) => {
            let err = FilingError::catalog_unavailable(source.describe(), err);
            let detail = err.detail();
            error!(stage = err.stage(), "{detail}; continuing with an empty catalog");
            (CatalogTables::default(), Some(detail))
        }
    };
    log_tables(&tables);

    if let Some(path) = &config.export_catalog {
        if catalog_error.is_none() {
            write_snapshot(path, &tables)?;
            info!(path = %path.display(), "exported catalog snapshot");
        } else {
            warn!(path = %path.display(), "catalog unavailable; snapshot not exported");
        }
    }

    let index = CatalogIndex::build(&tables);
    let mut filer = Filer::new(&index, &config.dest_root);
    filer.process_all(&files);
    let (mut report, registry) = filer.finish();
    report.catalog_error = catalog_error;

    for dir in registry.iter() {
        info!(dir = %dir.display(), "registry");
    }

    if let Some(group) = &config.group {
        let summary = propagate_group(&registry, group)
            .with_context(|| format!("propagating group '{group}'"))?;
        info!(
            group = %summary.group,
            gid = summary.gid,
            changed = summary.changed,
            failures = summary.failures,
            "group propagated"
        );
        report.ownership = Some(summary);
    }

    if let Some(path) = &config.report_path {
        report.write_json(path)?;
    }

    let summary = report.summary;
    info!(
        copied = summary.copied,
        overwritten = summary.overwritten,
        skipped_duplicate = summary.skipped_duplicate,
        failed = summary.failed,
        created_directories = report.created_directories,
        "run complete"
    );
    Ok(report.is_clean())
}

fn log_tables(tables: &CatalogTables) {
    for level in CatalogLevel::ALL {
        let rows = tables.table(level);
        info!(%level, rows = rows.len(), "catalog table loaded");
        for row in rows {
            debug!(
                %level,
                code = %row.code,
                display_code = row.display_code.as_deref().unwrap_or(""),
                display_name = row.display_name.as_deref().unwrap_or(""),
                "catalog row"
            );
        }
    }
}

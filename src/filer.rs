//! Per-file filing pipeline and run report.
//!
//! `Filer` drives decode → resolve → place for each source file in turn.
//! Failures are isolated per file: they are logged with the failing stage,
//! recorded in the report, and the next file is processed. The directory
//! registry accumulated along the way is handed back with the report.

use crate::catalog::CatalogIndex;
use crate::error::FilingError;
use crate::filename::decode_path;
use crate::ownership::OwnershipSummary;
use crate::placement::{Placement, place};
use crate::registry::DirectoryRegistry;
use crate::resolve::Resolver;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Where a successfully handled file ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filed {
    pub placement: Placement,
    pub dest: PathBuf,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Copied { dest: PathBuf },
    Overwritten { dest: PathBuf },
    SkippedDuplicate { dest: PathBuf },
    Failed { stage: &'static str, error: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FileRecord {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub copied: usize,
    pub overwritten: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub files: Vec<FileRecord>,
    /// Registry contents in first-seen order.
    pub directories: Vec<PathBuf>,
    pub created_directories: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipSummary>,
}

impl RunReport {
    /// True when every file was placed or skipped and nothing run-wide failed.
    pub fn is_clean(&self) -> bool {
        self.summary.failed == 0
            && self.catalog_error.is_none()
            && self.ownership.as_ref().is_none_or(|o| o.failures == 0)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing run report")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("writing run report {}", path.display()))
    }

    fn push(&mut self, source: &Path, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Copied { .. } => self.summary.copied += 1,
            FileOutcome::Overwritten { .. } => self.summary.overwritten += 1,
            FileOutcome::SkippedDuplicate { .. } => self.summary.skipped_duplicate += 1,
            FileOutcome::Failed { .. } => self.summary.failed += 1,
        }
        self.files.push(FileRecord {
            source: source.to_path_buf(),
            outcome,
        });
    }
}

pub struct Filer<'a> {
    resolver: Resolver<'a>,
    registry: DirectoryRegistry,
    report: RunReport,
}

impl<'a> Filer<'a> {
    pub fn new(index: &'a CatalogIndex, dest_root: &'a Path) -> Self {
        Self {
            resolver: Resolver::new(index, dest_root),
            registry: DirectoryRegistry::new(),
            report: RunReport::default(),
        }
    }

    /// File a single source, without recording it in the report.
    pub fn file(&mut self, source: &Path) -> Result<Filed, FilingError> {
        let token = decode_path(source)?;
        let mut created = Vec::new();
        let resolved = self
            .resolver
            .resolve_into(&token, &mut self.registry, &mut created);
        // Ancestors created before a failing level still count.
        self.report.created_directories += created.len();
        let dest = resolved?.dest_file;
        let placement = place(source, &dest)?;
        Ok(Filed { placement, dest })
    }

    /// File a source and record the outcome; never fails the run.
    pub fn process(&mut self, source: &Path) -> &FileOutcome {
        let outcome = match self.file(source) {
            Ok(Filed { placement, dest }) => match placement {
                Placement::Copied => FileOutcome::Copied { dest },
                Placement::Overwritten => FileOutcome::Overwritten { dest },
                Placement::SkippedDuplicate => FileOutcome::SkippedDuplicate { dest },
            },
            Err(err) => {
                log_failure(source, &err);
                FileOutcome::Failed {
                    stage: err.stage(),
                    error: err.detail(),
                }
            }
        };
        self.report.push(source, outcome);
        &self.report.files[self.report.files.len() - 1].outcome
    }

    pub fn process_all<I, P>(&mut self, sources: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for source in sources {
            self.process(source.as_ref());
        }
    }

    pub fn registry(&self) -> &DirectoryRegistry {
        &self.registry
    }

    /// Close the run, handing back the report and the final registry.
    pub fn finish(self) -> (RunReport, DirectoryRegistry) {
        let mut report = self.report;
        report.directories = self.registry.iter().map(Path::to_path_buf).collect();
        (report, self.registry)
    }
}

fn log_failure(source: &Path, err: &FilingError) {
    let stage = err.stage();
    let detail = err.detail();
    match err {
        FilingError::InvalidFilenameFormat { .. } | FilingError::UnresolvedCode { .. } => {
            warn!(source = %source.display(), stage, "skipping file: {detail}");
        }
        FilingError::DirectoryCreationFailed { .. }
        | FilingError::CopyFailed { .. }
        | FilingError::CatalogUnavailable { .. } => {
            error!(source = %source.display(), stage, "filing failed: {detail}");
        }
    }
}

//! Per-file failure taxonomy.
//!
//! Every variant except `CatalogUnavailable` is local to a single source file:
//! the filer records it, logs it with the failing stage, and moves on to the
//! next file. `CatalogUnavailable` affects the whole run and is surfaced once.

use crate::catalog::CatalogLevel;
use std::io;
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum FilingError {
    #[error("file name '{name}' does not match <org><sub>_<doc>_<name>")]
    InvalidFilenameFormat { name: String },

    #[error("{level} code '{code}' not found in catalog")]
    UnresolvedCode { level: CatalogLevel, code: String },

    #[error("unable to create directory {}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to copy {} to {}", source_path.display(), dest.display())]
    CopyFailed {
        source_path: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("catalog unavailable ({origin})")]
    CatalogUnavailable {
        origin: String,
        #[source]
        source: BoxError,
    },
}

impl FilingError {
    /// Pipeline stage that produced the error, used in logs and reports.
    pub fn stage(&self) -> &'static str {
        match self {
            FilingError::InvalidFilenameFormat { .. } => "decode",
            FilingError::UnresolvedCode { .. } => "resolve",
            FilingError::DirectoryCreationFailed { .. } => "mkdir",
            FilingError::CopyFailed { .. } => "copy",
            FilingError::CatalogUnavailable { .. } => "catalog",
        }
    }

    /// Message with every source error appended, `a: b: c`.
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = std::error::Error::source(err);
        }
        message
    }

    pub fn catalog_unavailable(origin: impl Into<String>, err: anyhow::Error) -> Self {
        FilingError::CatalogUnavailable {
            origin: origin.into(),
            source: err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn stage_names_follow_pipeline_order() {
        let decode = FilingError::InvalidFilenameFormat {
            name: "readme.txt".to_string(),
        };
        let resolve = FilingError::UnresolvedCode {
            level: CatalogLevel::SubUnit,
            code: "zzz".to_string(),
        };
        assert_eq!(decode.stage(), "decode");
        assert_eq!(resolve.stage(), "resolve");
        assert_eq!(
            resolve.to_string(),
            "sub-unit code 'zzz' not found in catalog"
        );
    }

    #[test]
    fn catalog_unavailable_keeps_anyhow_chain() {
        let err = FilingError::catalog_unavailable(
            "postgres://db",
            anyhow::anyhow!("connection refused"),
        );
        assert_eq!(err.stage(), "catalog");
        let source = err.source().expect("source kept");
        assert!(source.to_string().contains("connection refused"));
        assert_eq!(
            err.detail(),
            "catalog unavailable (postgres://db): connection refused"
        );
    }
}

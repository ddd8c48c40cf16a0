//! Filename grammar for filed documents.
//!
//! A fileable document is named `<org><sub>_<doc>_<rest>`: two three-character
//! catalog codes run together, an underscore, the three-character
//! document-type code, another underscore, then the name the file will carry
//! in its destination directory. Codes are word characters (Unicode letters,
//! digits or `_`) and are counted in characters, not bytes.

use crate::error::FilingError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

// Fixed-width groups pin the separators at character offsets 6 and 10, so the
// captures always coincide with name[0:3], name[3:6], name[7:10], name[11:].
static FILENAME_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\w{3})(\w{3})_(\w{3})_(\w.*)$").expect("filename grammar compiles")
});

/// Codes and remainder split out of a conforming file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilenameToken {
    pub org_code: String,
    pub sub_code: String,
    pub doc_code: String,
    /// Everything after `<org><sub>_<doc>_`, extension included.
    pub remainder: String,
}

/// Split a base name into its codes, or reject it.
pub fn decode(name: &str) -> Result<FilenameToken, FilingError> {
    let caps = FILENAME_GRAMMAR
        .captures(name)
        .ok_or_else(|| FilingError::InvalidFilenameFormat {
            name: name.to_string(),
        })?;
    let group = |idx: usize| caps.get(idx).map_or("", |m| m.as_str()).to_string();
    Ok(FilenameToken {
        org_code: group(1),
        sub_code: group(2),
        doc_code: group(3),
        remainder: group(4),
    })
}

/// Decode the base name of `path`. Names that are not valid UTF-8 are rejected.
pub fn decode_path(path: &Path) -> Result<FilenameToken, FilingError> {
    let Some(name) = path.file_name() else {
        return Err(FilingError::InvalidFilenameFormat {
            name: path.display().to_string(),
        });
    };
    match name.to_str() {
        Some(name) => decode(name),
        None => Err(FilingError::InvalidFilenameFormat {
            name: name.to_string_lossy().into_owned(),
        }),
    }
}

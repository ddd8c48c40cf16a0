//! Idempotent file placement.
//!
//! A destination that already holds the same bytes is left alone. Anything
//! else is replaced: the copy is staged in a temporary file next to the
//! destination and renamed over it, so readers never observe a half-written
//! file and a failed copy leaves the previous version intact.

use crate::error::FilingError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, warn};

const COMPARE_CHUNK: usize = 64 * 1024;
const STAGING_PREFIX: &str = ".docfiler-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Copied,
    /// A different file was already at the destination and was replaced.
    Overwritten,
    SkippedDuplicate,
}

/// Copy `source` to `dest` unless `dest` already has identical contents.
pub fn place(source: &Path, dest: &Path) -> Result<Placement, FilingError> {
    let copy_failed = |source_err: io::Error| FilingError::CopyFailed {
        source_path: source.to_path_buf(),
        dest: dest.to_path_buf(),
        source: source_err,
    };

    let existed = dest.is_file();
    if existed && same_contents(source, dest).map_err(copy_failed)? {
        info!(
            source = %source.display(),
            dest = %dest.display(),
            "destination already holds identical file; skipping"
        );
        return Ok(Placement::SkippedDuplicate);
    }

    copy_into_place(source, dest).map_err(copy_failed)?;
    if existed {
        warn!(
            source = %source.display(),
            dest = %dest.display(),
            "overwrote differing file"
        );
        Ok(Placement::Overwritten)
    } else {
        info!(source = %source.display(), dest = %dest.display(), "copied");
        Ok(Placement::Copied)
    }
}

/// Byte-for-byte comparison, short-circuiting on length.
pub fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    let mut left = File::open(a)?;
    let mut right = File::open(b)?;
    let mut left_buf = vec![0u8; COMPARE_CHUNK];
    let mut right_buf = vec![0u8; COMPARE_CHUNK];
    loop {
        let n = read_full(&mut left, &mut left_buf)?;
        let m = read_full(&mut right, &mut right_buf)?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

// Carries contents, permission bits and modification time.
fn copy_into_place(source: &Path, dest: &Path) -> io::Result<()> {
    let dir = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination {} has no parent directory", dest.display()),
        )
    })?;
    let meta = fs::metadata(source)?;
    let mut reader = File::open(source)?;
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)?;
    io::copy(&mut reader, staged.as_file_mut())?;
    if let Ok(modified) = meta.modified() {
        staged.as_file().set_modified(modified)?;
    }
    staged.as_file().set_permissions(meta.permissions())?;
    staged.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

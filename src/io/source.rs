//! Source text loading.
//!
//! The pipeline takes its seed text from a file or standard input. Input must
//! be valid UTF-8.

use crate::error::{IoError, Result};
use std::io::Read;
use std::path::Path;

/// Reads a UTF-8 text file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist, or
/// [`IoError::ReadFailed`] if it cannot be read as UTF-8.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    std::fs::read_to_string(path).map_err(|e| {
        IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Reads all of `reader` as UTF-8 text.
///
/// # Errors
///
/// Returns [`IoError::ReadFailed`] if reading fails or the bytes are not UTF-8.
pub fn read_to_string<R: Read>(mut reader: R, label: &str) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| IoError::ReadFailed {
            path: label.to_string(),
            reason: e.to_string(),
        })?;
    Ok(content)
}

/// Reads source text from `path`, or from stdin when `path` is `None` or `-`.
///
/// # Errors
///
/// Returns an I/O error if the source cannot be read.
pub fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => read_file(p),
        _ => read_to_string(std::io::stdin().lock(), "<stdin>"),
    }
}

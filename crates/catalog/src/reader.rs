//! Shared reader for header-prefixed, comma-delimited catalog files.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::CatalogError;

const DELIMITER: char = ',';

/// Read `path`, skip the header and blank lines, and hand every data line to
/// `parse` as trimmed fields. Every data line must have exactly `width` fields.
pub(crate) fn read_table<T>(
    path: &Path,
    width: usize,
    mut parse: impl FnMut(&[&str]) -> Result<T, String>,
) -> Result<Vec<T>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut out = Vec::new();
    for (idx, raw) in contents.lines().enumerate().skip(1) {
        if raw.trim().is_empty() {
            continue;
        }
        let line = idx + 1;
        let fields: Vec<&str> = raw.split(DELIMITER).map(str::trim).collect();
        if fields.len() != width {
            return Err(CatalogError::Malformed {
                path: path.to_path_buf(),
                line,
                reason: format!("expected {width} fields, found {}", fields.len()),
            });
        }
        let item = parse(&fields).map_err(|reason| CatalogError::Malformed {
            path: path.to_path_buf(),
            line,
            reason,
        })?;
        out.push(item);
    }

    tracing::debug!(path = %path.display(), records = out.len(), "catalog loaded");
    Ok(out)
}

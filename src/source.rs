use tracing::debug;

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Checks that `path` names an existing file, and returns it unchanged.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if nothing exists at `path`, or if it is not a
/// regular file (a directory, say).
pub fn resolve_source(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if !path.is_file() {
        return Err(Error::NotFound(path));
    }
    debug!("reading sales data from {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_source_fn_returns_existing_file_unchanged() {
        let path = resolve_source("testdata/sales.csv").unwrap();
        assert_eq!(path, PathBuf::from("testdata/sales.csv"));
    }

    #[test]
    fn resolve_source_fn_returns_not_found_for_missing_file() {
        let err = resolve_source("testdata/bogus.csv").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err:?}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn resolve_source_fn_returns_not_found_for_directory() {
        let err = resolve_source("testdata").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    }
}

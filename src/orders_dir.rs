use chrono::NaiveDate;
use tracing::info;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Returns the directory that order spreadsheets for `date` go in:
/// `Orders_YYYY-MM-DD`, next to the sales data file `source`.
///
/// # Examples
///
/// ```
/// # use std::path::Path;
/// # use chrono::NaiveDate;
/// # use orders::orders_dir_path;
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(
///     orders_dir_path("exports/sales.csv", date),
///     Path::new("exports/Orders_2024-03-09"),
/// );
/// ```
#[must_use]
pub fn orders_dir_path(source: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    let parent = source.as_ref().parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("Orders_{}", date.format("%Y-%m-%d")))
}

/// Creates the orders directory for `source` and `date`, along with any
/// missing parents, and returns its path.
///
/// It is not an error for the directory to exist already.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be created.
pub fn create_orders_dir(source: impl AsRef<Path>, date: NaiveDate) -> Result<PathBuf> {
    let dir = orders_dir_path(source, date);
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    info!("writing orders to {}", dir.display());
    Ok(dir)
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a run.
///
/// None of these are retried: each one ends the run, and [`Error::exit_code`]
/// tells the binary what status to exit with.
#[derive(Debug, Error)]
pub enum Error {
    /// The command line was wrong (missing or extra arguments, bad options).
    #[error("{0}")]
    Usage(String),

    /// The sales data file does not exist, or is not a regular file.
    #[error("the file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// The sales data could not be read as CSV.
    #[error("reading {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column we need is missing from the CSV header.
    #[error("reading {}: missing required column {column:?}", path.display())]
    Schema { path: PathBuf, column: &'static str },

    /// A field that must be numeric (or non-empty) was not.
    #[error("reading {}: line {line}: {message}", path.display())]
    Data {
        path: PathBuf,
        line: u64,
        column: Option<String>,
        message: String,
    },

    /// Creating the output directory or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The spreadsheet library refused to build or serialise a workbook.
    #[error("writing {}: {source}", path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl Error {
    /// Returns the process exit status for this error.
    ///
    /// * `1`: usage errors and missing input files
    /// * `2`: the input could not be parsed or failed validation
    /// * `3`: output could not be written
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) | Error::NotFound(_) => 1,
            Error::Parse { .. } | Error::Schema { .. } | Error::Data { .. } => 2,
            Error::Io { .. } | Error::Xlsx { .. } => 3,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

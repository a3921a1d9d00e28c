use std::{num::ParseIntError, path::PathBuf};

use crate::pipeline::Stage;

/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be opened for reading.
    ///
    /// Fatal for the reference files; for a transaction file only that file is dropped.
    #[error("Couldn't open {}: {source}", .path.display())]
    Open {
        /// The file that was requested
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// A report file could not be created
    #[error("Couldn't create {}: {source}", .path.display())]
    Create {
        /// The file that was requested
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// The data directory could not be listed while looking for transaction files
    #[error("Couldn't list {}: {source}", .dir.display())]
    Discover {
        /// The directory that was scanned
        dir: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// An open file failed part way through reading
    #[error("Error reading input: {0}")]
    Read(#[from] std::io::Error),
    /// Error reading or writing delimited files; could wrap IO or encoding errors
    #[error("Error processing delimited file: {0}")]
    Csv(#[from] csv::Error),
    /// A fatal error, tagged with the pipeline stage that failed
    #[error("{stage} failed: {source}")]
    Stage {
        /// Where the pipeline stopped
        stage: Stage,
        /// What went wrong
        source: Box<Error>,
    },
}

/// A problem with a single line of input.
///
/// These never stop a run: the offending line is logged and skipped.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LineError {
    /// The line had fewer fields than the record needs
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields {
        /// Minimum number of fields for the record
        expected: usize,
        /// Number of fields actually present
        found: usize,
    },
    /// The price field was not a decimal number
    #[error("invalid price: {0}")]
    Price(#[from] rust_decimal::Error),
    /// The quantity field was not an integer
    #[error("invalid quantity: {0}")]
    Quantity(#[from] ParseIntError),
}

impl LineError {
    /// Lines with too few fields are treated as noise rather than bad data
    #[must_use]
    pub fn is_noise(&self) -> bool {
        matches!(self, LineError::TooFewFields { .. })
    }
}

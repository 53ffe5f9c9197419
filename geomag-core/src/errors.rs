use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
///
/// Load-time failures ([`CoefficientsUnavailable`](GeomagError::CoefficientsUnavailable),
/// [`MalformedCoefficients`](GeomagError::MalformedCoefficients),
/// [`InvalidConfiguration`](GeomagError::InvalidConfiguration)) abort
/// initialisation entirely; no partially populated table is ever handed out.
/// Per-query failures are local to the failed call and leave the shared table
/// untouched.
#[derive(Error, Debug)]
pub enum GeomagError {
    /// Every candidate location in the coefficient search order was
    /// missing or unreadable.
    #[error("no readable coefficient file; tried {0:?}")]
    CoefficientsUnavailable(Vec<PathBuf>),
    /// The coefficient file header or a data row could not be parsed.
    #[error("coefficient file, line {line}: {message}")]
    MalformedCoefficients { line: usize, message: String },
    /// The configuration file was present but unreadable or not valid TOML.
    #[error("configuration {path:?}: {message}")]
    InvalidConfiguration { path: PathBuf, message: String },
    /// The query date lies before anything the table covers.
    #[error("date {date} precedes the first tabulated epoch {first_epoch}")]
    DateBeforeFirstEpoch { date: f64, first_epoch: i32 },
}

/// Convenience type for `Result<T, GeomagError>`.
pub type GeomagResult<T> = Result<T, GeomagError>;

//! Unified error types for longan.
//!
//! One error enum covers the whole crate: package/XML failures surface from
//! the container layer, coordinate errors from the public addressing API,
//! and stored-index errors from the internal cache-map layer.

use thiserror::Error;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Package part or document component not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// Malformed caller input (column letters, repeat counts, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A parsed coordinate component is outside the valid 1-based range
    #[error("Malformed coordinate: {0}")]
    MalformedCoordinate(String),

    /// Cache-map operation addressed a stored index beyond current bounds.
    ///
    /// This class never surfaces from the public `Row`/`Table` API, which
    /// pads instead; seeing it means a corrupted map.
    #[error("Stored index {index} out of range for a map of {len} runs")]
    IndexOutOfRange { index: usize, len: usize },

    /// Negative coordinate that cannot be resolved against the current width
    #[error("Coordinate {0} cannot be resolved against a width of {1}")]
    InvalidCoordinate(isize, usize),
}

/// Result type for longan operations.
pub type Result<T> = std::result::Result<T, Error>;

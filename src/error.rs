//! Error types for the dealership record store.

use thiserror::Error;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for record-store operations.
///
/// Read-only lookups report an absent key as `Ok(None)` rather than an
/// error; the variants here cover the fatal conditions only.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred, including a missing backing file on a
    /// write path.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A field value contains the reserved separator character and
    /// cannot be encoded.
    #[error("Invalid field value: {0}")]
    InvalidField(String),

    /// A car required by the operation is absent from the car index.
    #[error("Car not found: {0}")]
    CarNotFound(String),

    /// A sale required by the operation is absent from the sales index.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Stored data could not be decoded or parsed.
    #[error("Data corruption: {0}")]
    Corruption(String),
}

impl Error {
    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new invalid field error.
    pub fn invalid_field(msg: impl Into<String>) -> Self {
        Error::InvalidField(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::corruption("bad record");
        assert_eq!(err.to_string(), "Data corruption: bad record");

        let err = Error::CarNotFound("VIN1".to_string());
        assert!(err.to_string().contains("VIN1"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

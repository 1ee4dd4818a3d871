// src/error.rs

//! Error taxonomy for the install pipeline
//!
//! Every stage of the pipeline (fetch, verify, extract, place) has its own
//! terminal error variant. Nothing is retried automatically; each variant
//! maps to a distinct process exit code so scripts can tell the stages apart.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline and ambient errors
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch failed: connection error or non-2xx response
    #[error("network error: {0}")]
    NetworkError(String),

    /// Archive checksum did not match the recipe
    #[error("integrity error: sha256 mismatch: expected {expected}, got {actual}")]
    IntegrityError { expected: String, actual: String },

    /// Archive could not be decompressed or unpacked
    #[error("extraction error: {0}")]
    ExtractionError(String),

    /// Installing a file into the target directory failed
    #[error("placement error: {0}")]
    PlacementError(String),

    /// Recipe or config file is malformed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Filesystem operation failed outside the placement stage
    #[error("I/O error: {0}")]
    IoError(String),

    /// Client or environment setup failed
    #[error("initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Process exit code for this error
    ///
    /// 0 is success; each pipeline stage gets its own non-zero code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ParseError(_) => 2,
            Error::NetworkError(_) => 3,
            Error::IntegrityError { .. } => 4,
            Error::ExtractionError(_) => 5,
            Error::PlacementError(_) => 6,
            Error::IoError(_) | Error::InitError(_) => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_stage() {
        let errors = [
            Error::ParseError("bad".into()),
            Error::NetworkError("down".into()),
            Error::IntegrityError {
                expected: "aa".into(),
                actual: "bb".into(),
            },
            Error::ExtractionError("trunc".into()),
            Error::PlacementError("denied".into()),
        ];

        let codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        let mut unique = codes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(codes.len(), unique.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn test_display_names_the_stage() {
        let e = Error::IntegrityError {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("expected aa"));
        assert!(msg.contains("got bb"));

        assert!(Error::NetworkError("HTTP 404".into())
            .to_string()
            .contains("HTTP 404"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: Error = io.into();
        assert!(matches!(e, Error::IoError(_)));
    }
}

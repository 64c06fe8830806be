//! Error types for field and property cloning

/// Result type for cloning operations
pub type CloneResult<T> = Result<T, CloneError>;

/// Cloning error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloneError {
    /// A required argument was missing
    #[error("Invalid argument: `{parameter}` must not be null")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: &'static str,
    },

    /// A compiled copier was invoked with values of another type
    #[error("Copier mismatch: copier for {expected} applied to a value of a different type")]
    CopierMismatch {
        /// Type the copier was compiled for
        expected: &'static str,
    },
}

impl CloneError {
    /// Missing `source` argument
    pub fn null_source() -> Self {
        CloneError::InvalidArgument {
            parameter: "source",
        }
    }

    /// Missing `destination` argument
    pub fn null_destination() -> Self {
        CloneError::InvalidArgument {
            parameter: "destination",
        }
    }
}

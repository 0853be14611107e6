//! Crate-level error type and its classification.

use std::fmt;

use crate::output::OutputError;
use crate::store::StoreError;
use crate::table::LoaderError;

/// Class of a failure, deciding how a caller should react
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Inconsistent inputs or settings; fix the configuration and rerun
    Configuration,
    /// Identifications without exactly one sample description row
    ReferentialIntegrity,
    /// Transient store contention; the same run may succeed later
    Retryable,
    /// File system, parse or database failure
    Io,
}

impl ErrorKind {
    /// Process exit status of the command-line tool for this class.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::ReferentialIntegrity => 3,
            ErrorKind::Retryable => 75,
            ErrorKind::Io => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::ReferentialIntegrity => "referential integrity error",
            ErrorKind::Retryable => "retryable error",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

/// Errors of a combine run
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    /// Loading inputs failed
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// Store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Building or writing the output failed
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid run settings
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CombineError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CombineError::Loader(e) if e.is_configuration() => ErrorKind::Configuration,
            CombineError::Loader(_) => ErrorKind::Io,
            CombineError::Store(StoreError::ReferentialIntegrity { .. }) => ErrorKind::ReferentialIntegrity,
            CombineError::Store(StoreError::ColumnConflict(_)) => ErrorKind::Configuration,
            CombineError::Store(e) if e.is_retryable() => ErrorKind::Retryable,
            CombineError::Store(_) => ErrorKind::Io,
            CombineError::Output(OutputError::DuplicateColumn(_)) => ErrorKind::Configuration,
            CombineError::Output(OutputError::MissingFile(_)) => ErrorKind::Configuration,
            CombineError::Output(_) => ErrorKind::Io,
            CombineError::Config(_) => ErrorKind::Configuration,
        }
    }
}

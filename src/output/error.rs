use std::path::PathBuf;

/// Errors that can occur while building or writing the combined table
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization or parsing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A dynamic column name collides with an earlier output column
    #[error("Output column '{0}' is defined twice (sample names must not repeat fixed or allele column names)")]
    DuplicateColumn(String),

    /// A row does not match the output schema
    #[error("Row has {actual} values but the output has {expected} columns")]
    RowWidth {
        /// Number of output columns
        expected: usize,
        /// Number of values in the row
        actual: usize,
    },

    /// A combined table to summarize does not exist
    #[error("File does not exist: {0}")]
    MissingFile(PathBuf),
}

use std::path::PathBuf;

/// Errors that can occur while loading identification tables or the sample
/// description
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// I/O error reading an input file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV/TSV parsing error
    #[error("Failed to parse {path}: {source}")]
    Csv {
        /// File being parsed
        path: PathBuf,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },

    /// No input tables were given or discovered
    #[error("No input files")]
    NoInputs,

    /// An input file does not exist
    #[error("Input file does not exist: {0}")]
    MissingFile(PathBuf),

    /// Explicit provenance labels do not match the input files one-to-one
    #[error("Wrong amount of run names: {labels} (should be {files})")]
    LabelCountMismatch {
        /// Number of labels supplied
        labels: usize,
        /// Number of input files
        files: usize,
    },

    /// A discovered file does not start with a known category token
    #[error("Unrecognized category '{token}' in file name {file} (expected one of: {expected})")]
    UnknownCategory {
        /// Offending file
        file: PathBuf,
        /// Leading token of the file name
        token: String,
        /// Comma-separated list of accepted categories
        expected: String,
    },

    /// Two distinct headers normalize to the same column name
    #[error("Columns '{first}' and '{second}' both normalize to '{normalized}'")]
    ColumnCollision {
        /// Normalized column name
        normalized: String,
        /// First original header
        first: String,
        /// Second original header
        second: String,
    },

    /// A required column is missing
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// File lacking the column
        path: PathBuf,
        /// Name of the missing column
        column: String,
    },

    /// A required key field is empty
    #[error("Empty {column} at line {line} of {path}")]
    EmptyKey {
        /// File containing the row
        path: PathBuf,
        /// 1-based line number
        line: u64,
        /// Name of the key column
        column: String,
    },

    /// The field delimiter is not a single byte
    #[error("Invalid delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether the error stems from an inconsistent run configuration rather
    /// than from reading a file.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, LoaderError::Io { .. } | LoaderError::Csv { .. })
    }
}

use rusqlite::ErrorCode;

/// Errors that can occur while loading or querying a relational store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error reported by SQLite
    #[error("SQLite error: {0}")]
    SqliteError(rusqlite::Error),

    /// The database is busy or locked by another connection
    #[error("Database is busy or locked: {0}")]
    Busy(rusqlite::Error),

    /// I/O error on the database file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The join with the sample description did not preserve the row count
    #[error(
        "Error in joining data with sample description: {data_rows} data rows but {joined_rows} joined rows \
         (every Source_File must appear exactly once in the sample description)"
    )]
    ReferentialIntegrity {
        /// Rows in `data`
        data_rows: usize,
        /// Rows in `ext_data`
        joined_rows: usize,
    },

    /// A data column clashes with a store-managed column
    #[error("Data column '{0}' conflicts with a sample description or store column")]
    ColumnConflict(String),

    /// The store was queried before being loaded or joined
    #[error("Store not loaded: {0}")]
    NotLoaded(&'static str),
}

impl StoreError {
    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => StoreError::Busy(err),
            _ => StoreError::SqliteError(err),
        }
    }
}

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use super::{AggregatedRow, OutputError, OutputSchema};
use crate::table::compression::{finish_writer, is_gzip_path, wrap_writer, TableSink};

/// Field delimiter of the combined table.
pub const OUTPUT_DELIMITER: u8 = b'\t';

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "combined_results.csv.gz";

/// Statistics from a finished write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Number of data rows written
    pub rows_written: usize,
    /// Number of columns per row
    pub columns: usize,
    /// Size of the persisted file in bytes
    pub file_size_bytes: u64,
    /// Whether the file is gzip-compressed
    pub compressed: bool,
}

/// Streaming writer for the combined table.
///
/// Rows go to a temporary file next to the destination; [`finish`](Self::finish)
/// atomically renames it into place, so an aborted run leaves no partial file.
pub struct TableWriter {
    temp_file: NamedTempFile,
    writer: csv::Writer<TableSink>,
    destination: PathBuf,
    columns: usize,
    rows_written: usize,
    compressed: bool,
}

impl TableWriter {
    /// Create a writer and emit the header row.
    ///
    /// The output is gzip-compressed when `destination` ends in `.gz`.
    pub fn create<P: AsRef<Path>>(destination: P, schema: &OutputSchema) -> Result<Self, OutputError> {
        let destination = destination.as_ref().to_path_buf();
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp_file = NamedTempFile::new_in(&dir)?;
        let compressed = is_gzip_path(&destination);
        let sink = wrap_writer(temp_file.reopen()?, compressed);

        let mut writer = csv::WriterBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .from_writer(sink);
        writer.write_record(schema.columns())?;
        debug!(
            "Writing {} columns to temporary file {}",
            schema.len(),
            temp_file.path().display()
        );

        Ok(Self {
            temp_file,
            writer,
            destination,
            columns: schema.len(),
            rows_written: 0,
            compressed,
        })
    }

    /// Append one row.
    pub fn write_row(&mut self, row: &AggregatedRow) -> Result<(), OutputError> {
        if row.values().len() != self.columns {
            return Err(OutputError::RowWidth {
                expected: self.columns,
                actual: row.values().len(),
            });
        }
        self.writer
            .write_record(row.values().iter().map(|v| v.to_string()))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush all data and move the file to its destination.
    pub fn finish(mut self) -> Result<OutputStats, OutputError> {
        self.writer.flush()?;
        let sink = self
            .writer
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        finish_writer(sink)?;

        self.temp_file
            .persist(&self.destination)
            .map_err(|e| OutputError::IoError(e.error))?;
        let file_size_bytes = std::fs::metadata(&self.destination)?.len();

        info!(
            "Wrote {} rows to {} ({} bytes)",
            self.rows_written,
            self.destination.display(),
            file_size_bytes
        );
        Ok(OutputStats {
            rows_written: self.rows_written,
            columns: self.columns,
            file_size_bytes,
            compressed: self.compressed,
        })
    }
}

/// Write a complete combined table.
pub fn write_table<P: AsRef<Path>>(
    destination: P,
    schema: &OutputSchema,
    rows: &[AggregatedRow],
) -> Result<OutputStats, OutputError> {
    let mut writer = TableWriter::create(destination, schema)?;
    for row in rows {
        writer.write_row(row)?;
    }
    writer.finish()
}

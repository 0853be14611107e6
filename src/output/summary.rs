use std::fmt;
use std::path::{Path, PathBuf};

use super::schema::{BASE_COLUMNS, BEST_Q, FILTERED_HLA_ALLELE, INTENSITY_PREFIX, INTENSITY_SUM, SAMPLES};
use super::writer::OUTPUT_DELIMITER;
use super::OutputError;
use crate::table::columns::is_allele_column;
use crate::table::compression::open_reader;

/// Summary of a combined table on disk
#[derive(Debug, Clone, Default)]
pub struct TableSummary {
    /// Summarized file
    pub path: PathBuf,
    /// Number of peptide rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
    /// Allele prediction columns
    pub allele_columns: Vec<String>,
    /// Replica-count (sample) columns
    pub sample_columns: Vec<String>,
    /// Intensity matrix columns
    pub intensity_columns: Vec<String>,
    /// Rows with a non-empty `Filtered_HLA_allele`
    pub rows_with_binder: usize,
    /// (min, max) of `Best_Q`
    pub best_q_range: Option<(f64, f64)>,
}

impl TableSummary {
    /// Read and summarize a combined table.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OutputError::MissingFile(path.to_path_buf()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .flexible(true)
            .from_reader(open_reader(path)?);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let filtered_pos = position(FILTERED_HLA_ALLELE);
        let best_q_pos = position(BEST_Q);

        let mut summary = TableSummary {
            path: path.to_path_buf(),
            columns: headers.len(),
            ..Default::default()
        };

        // Sample columns sit between the derived block and Intensity_Sum
        let derived_end = position(SAMPLES).map(|p| p + 1);
        let sum_pos = position(INTENSITY_SUM);
        for (i, header) in headers.iter().enumerate() {
            if is_allele_column(header) && !BASE_COLUMNS.contains(&header.as_str()) {
                summary.allele_columns.push(header.clone());
            } else if header.starts_with(INTENSITY_PREFIX) && header != INTENSITY_SUM {
                summary.intensity_columns.push(header.clone());
            } else if let (Some(start), Some(end)) = (derived_end, sum_pos) {
                if i >= start && i < end {
                    summary.sample_columns.push(header.clone());
                }
            }
        }

        for record in reader.records() {
            let record = record?;
            summary.rows += 1;
            if let Some(field) = filtered_pos.and_then(|p| record.get(p)) {
                if !field.is_empty() {
                    summary.rows_with_binder += 1;
                }
            }
            if let Some(q) = best_q_pos
                .and_then(|p| record.get(p))
                .and_then(|f| f.parse::<f64>().ok())
            {
                summary.best_q_range = Some(match summary.best_q_range {
                    Some((lo, hi)) => (lo.min(q), hi.max(q)),
                    None => (q, q),
                });
            }
        }

        Ok(summary)
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Combined table: {}", self.path.display())?;
        writeln!(f, "  Peptides: {}", self.rows)?;
        writeln!(f, "  Columns: {}", self.columns)?;
        writeln!(
            f,
            "  Allele columns ({}): {}",
            self.allele_columns.len(),
            self.allele_columns.join(", ")
        )?;
        writeln!(
            f,
            "  Samples ({}): {}",
            self.sample_columns.len(),
            self.sample_columns.join(", ")
        )?;
        writeln!(f, "  Intensity columns: {}", self.intensity_columns.len())?;
        writeln!(f, "  Peptides with filtered binder: {}", self.rows_with_binder)?;
        if let Some((lo, hi)) = self.best_q_range {
            writeln!(f, "  Best_Q range: {} - {}", lo, hi)?;
        }
        Ok(())
    }
}

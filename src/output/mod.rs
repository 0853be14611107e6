//! # Output Module
//!
//! Layout and serialization of the combined per-peptide table.
//!
//! The column order is fixed: base columns of the best record, the allele
//! prediction columns found in the input, derived roll-ups, one replica-count
//! column per sample, `Intensity_Sum`, then the intensity matrix. Files are
//! tab-delimited, gzip-compressed when the name ends in `.gz`, and written
//! atomically.

mod error;
mod schema;
mod summary;
mod writer;


pub use error::OutputError;
pub use schema::{
    intensity_column, AggregatedRow, OutputSchema, BASE_COLUMNS, BEST_ALC, BEST_Q, CATEGORIES, DERIVED_COLUMNS,
    FILTERED_HLA_ALLELE, INTENSITY_PREFIX, INTENSITY_SUM, SAMPLES, STATUS_OVER_SEQUENCE,
};
pub use summary::TableSummary;
pub use writer::{write_table, OutputStats, TableWriter, DEFAULT_OUTPUT, OUTPUT_DELIMITER};

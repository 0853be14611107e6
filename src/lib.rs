//! # PRISM combine - Peptide Aggregation Engine
//!
//! `prism_combine` merges the peptide identification tables of a PRISM run
//! (one table per acquisition run and search category) into a single table
//! with one row per peptide sequence, annotated with sample-level provenance,
//! replica counts and a per-replica intensity matrix.
//!
//! ## Pipeline
//!
//! 1. [`table`]: identification tables are unioned into one normalized table,
//!    decoys dropped, and every row stamped with its provenance label
//! 2. [`store`]: the table and the sample description are loaded into a
//!    [`store::RelationalStore`] and inner-joined on `Source_File`; every
//!    identification must match exactly one description row
//! 3. [`resolver`]: each peptide group collapses to its best record (lowest
//!    `Q`, then lowest `netMHC_rank`), gated on a Q-value threshold and
//!    enriched with roll-ups, a filtered HLA allele and intensities
//! 4. [`output`]: rows are written tab-delimited (gzip when the name ends in
//!    `.gz`) and atomically persisted
//!
//! [`combine::run`] drives the whole pipeline; [`validator::validate_inputs`]
//! performs every check of a run without writing output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_combine::combine::{self, CombineConfig};
//! use prism_combine::table::InputFile;
//!
//! let inputs = vec![
//!     InputFile::with_label("prio1.run1.tsv", "prio1"),
//!     InputFile::with_label("prio2.run1.tsv", "prio2"),
//! ];
//! let mut config = CombineConfig::new(inputs, "samples.tsv");
//! config.output = "combined_results.csv.gz".into();
//!
//! let stats = combine::run(&config)?;
//! println!("{}", stats);
//! # Ok::<(), prism_combine::CombineError>(())
//! ```
//!
//! ## Output Columns
//!
//! | Group | Columns |
//! |-------|---------|
//! | Best record | `Sequence`, `Q`, `ALC`, `netMHC_rank`, `HLA_allele`, ... |
//! | Allele predictions | every `HLA_A*`, `HLA_B*`, `HLA_C*` column of the input |
//! | Derived | `Filtered_HLA_allele`, `Best_Q`, `Best_ALC`, `Categories`, `Status_over_sequence`, `Samples`, `Databases_PRISM` |
//! | Replica counts | one column per sample |
//! | Intensities | `Intensity_Sum`, then `Intensity_{sample}_{replica}` |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod combine;
pub mod error;
pub mod output;
pub mod resolver;
pub mod store;
pub mod table;
pub mod validator;

pub use error::{CombineError, ErrorKind};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::combine::{run, CombineConfig, CombineStats, StoreBackend};
    pub use crate::error::{CombineError, ErrorKind};
    pub use crate::output::{AggregatedRow, OutputSchema, TableSummary};
    pub use crate::resolver::{PeptideResolver, ResolverConfig};
    pub use crate::store::{MemoryStore, PeptideGroup, RelationalStore, SqliteStore};
    pub use crate::table::{InputFile, LoaderConfig, SampleDescription, Table, TableLoader, Value};
    pub use crate::validator::{validate_inputs, ValidationReport};
}

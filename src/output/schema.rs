use crate::store::SampleLayout;
use crate::table::columns::is_allele_column;
use crate::table::{Schema, Value};

use super::OutputError;

/// Columns copied from the best record, in output order.
pub const BASE_COLUMNS: [&str; 21] = [
    "Source_File",
    "Feature",
    "Scan",
    "ALC",
    "Length",
    "RT",
    "Mass",
    "ppm",
    "ID",
    "Location_count",
    "Genome",
    "Location",
    "Sequence",
    "Top_location_count",
    "Top_location_count_no_decoy",
    "Q",
    "Gene",
    "Symbol",
    "ORF_location",
    "HLA_allele",
    "netMHC_rank",
];

/// Allele of the best record passing the binding-rank threshold
pub const FILTERED_HLA_ALLELE: &str = "Filtered_HLA_allele";
/// Q of the best record
pub const BEST_Q: &str = "Best_Q";
/// Highest ALC across the peptide's records
pub const BEST_ALC: &str = "Best_ALC";
/// Distinct annotation categories
pub const CATEGORIES: &str = "Categories";
/// Distinct sample types the peptide was seen in
pub const STATUS_OVER_SEQUENCE: &str = "Status_over_sequence";
/// Distinct sample names the peptide was seen in
pub const SAMPLES: &str = "Samples";
/// Sum of all intensity cells
pub const INTENSITY_SUM: &str = "Intensity_Sum";

/// Derived per-peptide columns following the allele columns.
pub const DERIVED_COLUMNS: [&str; 7] = [
    FILTERED_HLA_ALLELE,
    BEST_Q,
    BEST_ALC,
    CATEGORIES,
    STATUS_OVER_SEQUENCE,
    crate::table::columns::DATABASES_PRISM,
    SAMPLES,
];

/// Prefix of the intensity matrix columns.
pub const INTENSITY_PREFIX: &str = "Intensity_";

/// Name of the intensity column of one (sample, replica) cell.
pub fn intensity_column(sample: &str, replica: &str) -> String {
    format!("{}{}_{}", INTENSITY_PREFIX, sample, replica)
}

/// Column layout of the combined table.
///
/// Fixed base columns, allele columns discovered in `ext_data`, derived
/// columns, one replica-count column per sample, `Intensity_Sum` and the
/// intensity matrix.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    schema: Schema,
    allele_columns: Vec<String>,
    layout: SampleLayout,
}

impl OutputSchema {
    /// Build the layout for the given allele columns and samples.
    pub fn new(allele_columns: Vec<String>, layout: SampleLayout) -> Result<Self, OutputError> {
        let mut schema = Schema::default();
        let mut push = |name: String| -> Result<(), OutputError> {
            if schema.contains(&name) {
                return Err(OutputError::DuplicateColumn(name));
            }
            schema.push(name);
            Ok(())
        };

        for column in BASE_COLUMNS {
            push(column.to_string())?;
        }
        for column in &allele_columns {
            push(column.clone())?;
        }
        for column in DERIVED_COLUMNS {
            push(column.to_string())?;
        }
        for sample in layout.sample_names() {
            push(sample.to_string())?;
        }
        push(INTENSITY_SUM.to_string())?;
        for (sample, replica) in layout.cells() {
            push(intensity_column(sample, replica))?;
        }

        Ok(Self {
            schema,
            allele_columns,
            layout,
        })
    }

    /// Layout for an `ext_data` schema: allele columns in discovery order.
    pub fn for_ext_schema(ext_schema: &Schema, layout: SampleLayout) -> Result<Self, OutputError> {
        let allele_columns = ext_schema
            .columns()
            .iter()
            .filter(|c| is_allele_column(c))
            .cloned()
            .collect();
        Self::new(allele_columns, layout)
    }

    /// Output column names in order.
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// Number of output columns.
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    /// Whether there are no columns (never true for a built schema).
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Allele prediction columns carried into the output.
    pub fn allele_columns(&self) -> &[String] {
        &self.allele_columns
    }

    /// Samples and replicas of the intensity matrix.
    pub fn layout(&self) -> &SampleLayout {
        &self.layout
    }
}

/// One output row, aligned to an [`OutputSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    values: Vec<Value>,
}

impl AggregatedRow {
    /// Wrap values already in output column order.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Values in output column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of a named column.
    pub fn get<'a>(&'a self, schema: &OutputSchema, column: &str) -> Option<&'a Value> {
        schema.schema.position(column).and_then(|pos| self.values.get(pos))
    }
}

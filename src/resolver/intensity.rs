//! Per-peptide intensity matrix over the sample layout.

use std::collections::HashMap;

use crate::store::{PeptideGroup, SampleLayout};
use crate::table::columns::{INTENSITY, SAMPLE_NAME, SAMPLE_REPLICA};

/// Dense sample x replica intensity grid of one peptide.
///
/// Cells follow [`SampleLayout::cells`]; replica counts follow
/// [`SampleLayout::sample_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityMatrix {
    cells: Vec<f64>,
    rep_counts: Vec<usize>,
}

impl IntensityMatrix {
    /// Build the grid from a peptide's records.
    ///
    /// A cell holds the intensity of the first record (lowest `Rec_ID`) of
    /// that sample and replica; a missing record or a missing or non-numeric
    /// intensity is 0.
    pub fn build(group: &PeptideGroup, layout: &SampleLayout) -> Self {
        let mut first: HashMap<(String, String), f64> = HashMap::new();
        for record in group.records() {
            let (Some(sample), Some(replica)) = (record.get(SAMPLE_NAME), record.get(SAMPLE_REPLICA)) else {
                continue;
            };
            if sample.is_null() || replica.is_null() {
                continue;
            }
            let intensity = record.get(INTENSITY).and_then(|v| v.as_f64()).unwrap_or(0.0);
            first
                .entry((sample.to_string(), replica.to_string()))
                .or_insert(intensity);
        }

        let mut cells = Vec::with_capacity(layout.cell_count());
        let mut rep_counts = Vec::with_capacity(layout.len());
        for (sample, replicas) in layout.samples() {
            let mut seen = 0;
            for replica in replicas {
                match first.get(&(sample.clone(), replica.clone())) {
                    Some(&intensity) => {
                        seen += 1;
                        cells.push(intensity);
                    }
                    None => cells.push(0.0),
                }
            }
            rep_counts.push(seen);
        }

        Self { cells, rep_counts }
    }

    /// Intensity per (sample, replica) cell.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Number of replicas of each sample in which the peptide was identified.
    pub fn rep_counts(&self) -> &[usize] {
        &self.rep_counts
    }

    /// Sum of all cells.
    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }
}

//! # Resolver Module
//!
//! Turns every peptide group into at most one output row:
//!
//! 1. best record: `ORDER BY Q, netMHC_rank LIMIT 1`
//! 2. quality gate: best `Q` strictly below the threshold
//! 3. best ALC, binding filter, roll-ups and the intensity matrix
//!
//! Peptides failing the gate are dropped silently and only counted.

pub mod hla;
pub mod intensity;


use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use hla::{normalize_allele, AlleleFilter, DEFAULT_BINDING_RANK_THRESHOLD};
pub use intensity::IntensityMatrix;

use crate::output::{AggregatedRow, OutputSchema, BASE_COLUMNS};
use crate::store::PeptideGroup;
use crate::table::columns::{ALC, CATEGORY, DATABASES_PRISM, NETMHC_RANK, Q, SAMPLE_NAME, SAMPLE_TYPE};
use crate::table::Value;

/// Default Q-value threshold (1% FDR).
pub const DEFAULT_Q_THRESHOLD: f64 = 0.01;

/// Settings of the per-peptide resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Exclusive upper bound on the best Q; `None` keeps every peptide with a Q
    pub q_threshold: Option<f64>,
    /// Exclusive upper bound on the netMHC rank of the filtered allele
    pub binding_rank_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            q_threshold: Some(DEFAULT_Q_THRESHOLD),
            binding_rank_threshold: DEFAULT_BINDING_RANK_THRESHOLD,
        }
    }
}

/// Result of resolving a batch of groups
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Output rows in group order
    pub rows: Vec<AggregatedRow>,
    /// Peptides dropped by the quality gate
    pub dropped: usize,
}

/// Resolves peptide groups into rows of an [`OutputSchema`].
#[derive(Debug, Clone)]
pub struct PeptideResolver<'a> {
    config: ResolverConfig,
    allele_filter: AlleleFilter,
    schema: &'a OutputSchema,
}

impl<'a> PeptideResolver<'a> {
    /// Create a resolver for the given output layout.
    pub fn new(config: ResolverConfig, schema: &'a OutputSchema) -> Self {
        Self {
            config,
            allele_filter: AlleleFilter::new(config.binding_rank_threshold),
            schema,
        }
    }

    /// Whether a best Q passes the quality gate.
    pub fn passes_gate(&self, best_q: Option<f64>) -> bool {
        match (best_q, self.config.q_threshold) {
            (None, _) => false,
            (Some(q), Some(threshold)) => q < threshold,
            (Some(_), None) => true,
        }
    }

    /// Resolve one group; `None` when the peptide fails the quality gate.
    pub fn resolve(&self, group: &PeptideGroup) -> Option<AggregatedRow> {
        let best = group.ordered_top(&[Q, NETMHC_RANK])?;
        let best_q = best.get(Q).and_then(Value::as_f64);
        if !self.passes_gate(best_q) {
            debug!("Dropping {} (best Q {:?})", group.sequence(), best_q);
            return None;
        }

        let matrix = IntensityMatrix::build(group, self.schema.layout());
        let mut values = Vec::with_capacity(self.schema.len());

        for column in BASE_COLUMNS {
            values.push(best.value(column));
        }
        for column in self.schema.allele_columns() {
            values.push(best.value(column));
        }

        values.push(self.allele_filter.filter(&best).into());
        values.push(best.value(Q));
        values.push(group.max(ALC).into());
        values.push(Value::Text(group.group_concat_distinct(CATEGORY, false)));
        values.push(Value::Text(group.group_concat_distinct(SAMPLE_TYPE, false)));
        values.push(Value::Text(group.group_concat_distinct(DATABASES_PRISM, true)));
        values.push(Value::Text(group.group_concat_distinct(SAMPLE_NAME, false)));

        values.extend(matrix.rep_counts().iter().map(|&n| Value::from(n)));
        values.push(Value::Real(matrix.sum()));
        values.extend(matrix.cells().iter().map(|&v| Value::Real(v)));

        Some(AggregatedRow::new(values))
    }

    /// Resolve all groups, keeping their order.
    pub fn resolve_all(&self, groups: &[PeptideGroup]) -> Resolution {
        #[cfg(feature = "parallel")]
        let resolved: Vec<Option<AggregatedRow>> = groups.par_iter().map(|g| self.resolve(g)).collect();

        #[cfg(not(feature = "parallel"))]
        let resolved: Vec<Option<AggregatedRow>> = groups.iter().map(|g| self.resolve(g)).collect();

        let mut resolution = Resolution::default();
        for row in resolved {
            match row {
                Some(row) => resolution.rows.push(row),
                None => resolution.dropped += 1,
            }
        }
        resolution
    }
}

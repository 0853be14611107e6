//! Property tests for normalization, the quality gate and the intensity matrix.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use prism_combine::output::OutputSchema;
use prism_combine::resolver::{IntensityMatrix, PeptideResolver, ResolverConfig};
use prism_combine::store::{PeptideGroup, SampleLayout};
use prism_combine::table::columns::normalize_column_name;
use prism_combine::table::{Schema, Value};

const COLUMNS: [&str; 6] = ["Rec_ID", "Sequence", "Q", "Sample_Name", "Sample_Replica", "Intensity"];

/// One record: (sample index, replica index, Q, intensity)
type Record = (usize, usize, f64, Option<f64>);

fn group_of(records: &[Record]) -> PeptideGroup {
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, (sample, replica, q, intensity))| {
            vec![
                Value::Integer(i as i64 + 1),
                Value::Text("PEPTIDE".into()),
                Value::Real(*q),
                Value::Text(format!("S{}", sample)),
                Value::Text(format!("R{}", replica)),
                Value::from(*intensity),
            ]
        })
        .collect();
    PeptideGroup::new("PEPTIDE", Arc::new(Schema::new(COLUMNS)), rows)
}

fn layout_of(records: &[Record]) -> SampleLayout {
    SampleLayout::from_pairs(
        records
            .iter()
            .map(|(s, r, _, _)| (format!("S{}", s), format!("R{}", r))),
    )
}

fn record() -> impl Strategy<Value = Record> {
    (0usize..3, 0usize..3, 0.0f64..0.1, proptest::option::of(0.0f64..1e6))
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[ -~]{0,40}") {
        let once = normalize_column_name(&raw);
        prop_assert_eq!(normalize_column_name(&once), once);
    }

    #[test]
    fn lowering_threshold_never_adds_peptides(
        groups in proptest::collection::vec(proptest::collection::vec(record(), 1..5), 1..8),
        high in 0.0f64..0.1,
        delta in 0.0f64..0.05,
    ) {
        let groups: Vec<PeptideGroup> = groups.iter().map(|g| group_of(g)).collect();
        let schema = OutputSchema::new(vec![], SampleLayout::default()).unwrap();
        let resolve = |threshold: f64| {
            let config = ResolverConfig { q_threshold: Some(threshold), ..ResolverConfig::default() };
            PeptideResolver::new(config, &schema).resolve_all(&groups).rows.len()
        };
        prop_assert!(resolve(high - delta) <= resolve(high));
    }

    #[test]
    fn intensity_matrix_covers_layout(records in proptest::collection::vec(record(), 1..12)) {
        let layout = layout_of(&records);
        let group = group_of(&records);
        let matrix = IntensityMatrix::build(&group, &layout);

        let pairs: BTreeSet<(usize, usize)> = records.iter().map(|(s, r, _, _)| (*s, *r)).collect();
        prop_assert_eq!(matrix.cells().len(), pairs.len());
        prop_assert_eq!(matrix.cells().len(), layout.cell_count());

        let sum: f64 = matrix.cells().iter().sum();
        prop_assert!((matrix.sum() - sum).abs() <= 1e-6 * sum.max(1.0));
        prop_assert!(matrix.cells().iter().all(|v| *v >= 0.0));
    }
}

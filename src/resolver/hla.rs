//! Binding-prediction filter on the best record's HLA allele.

use crate::store::RecordRef;
use crate::table::columns::{is_allele_column, HLA_ALLELE};

/// Default netMHC percentile rank below which a peptide counts as a binder.
pub const DEFAULT_BINDING_RANK_THRESHOLD: f64 = 2.0;

/// Normalize an allele name to its column name: `HLA-A*02:01` -> `HLA_A0201`.
pub fn normalize_allele(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '*' | ':'))
        .map(|c| if c == '-' { '_' } else { c })
        .collect()
}

/// Accepts the best allele of a record when its own prediction column shows
/// a binding rank below the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlleleFilter {
    binding_rank_threshold: f64,
}

impl Default for AlleleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BINDING_RANK_THRESHOLD)
    }
}

impl AlleleFilter {
    /// Create a filter with the given rank threshold (exclusive).
    pub fn new(binding_rank_threshold: f64) -> Self {
        Self { binding_rank_threshold }
    }

    /// Rank threshold in use.
    pub fn threshold(&self) -> f64 {
        self.binding_rank_threshold
    }

    /// The normalized allele of `record` if it names an allele column of the
    /// record whose numeric value is below the threshold.
    pub fn filter(&self, record: &RecordRef<'_>) -> Option<String> {
        let raw = record.get(HLA_ALLELE)?.as_str()?;
        let allele = normalize_allele(raw);
        if !is_allele_column(&allele) {
            return None;
        }
        let rank = record.get(&allele)?.as_f64()?;
        (rank < self.binding_rank_threshold).then_some(allele)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PeptideGroup;
    use crate::table::{Schema, Value};
    use std::sync::Arc;

    fn best_of(allele: Value, a0201: Value) -> PeptideGroup {
        let schema = Arc::new(Schema::new(["Rec_ID", "HLA_allele", "HLA_A0201", "HLA_B0702"]));
        PeptideGroup::new(
            "PEPTIDE",
            schema,
            vec![vec![Value::Integer(1), allele, a0201, Value::Real(0.1)]],
        )
    }

    fn filtered(group: &PeptideGroup) -> Option<String> {
        let record = group.records().next().unwrap();
        AlleleFilter::default().filter(&record)
    }

    #[test]
    fn test_normalize_allele() {
        assert_eq!(normalize_allele("HLA-A*02:01"), "HLA_A0201");
        assert_eq!(normalize_allele(" HLA-C*07:02 "), "HLA_C0702");
        assert_eq!(normalize_allele("HLA_B0702"), "HLA_B0702");
    }

    #[test]
    fn test_binder_accepted() {
        let g = best_of(Value::Text("HLA-A*02:01".into()), Value::Real(0.5));
        assert_eq!(filtered(&g).as_deref(), Some("HLA_A0201"));
    }

    #[test]
    fn test_rank_at_threshold_rejected() {
        let g = best_of(Value::Text("HLA-A*02:01".into()), Value::Integer(2));
        assert_eq!(filtered(&g), None);
    }

    #[test]
    fn test_missing_or_unknown_allele() {
        assert_eq!(filtered(&best_of(Value::Null, Value::Real(0.5))), None);
        assert_eq!(filtered(&best_of(Value::Text("HLA-A*03:01".into()), Value::Real(0.5))), None);
        assert_eq!(filtered(&best_of(Value::Text("DRB1*01:01".into()), Value::Real(0.5))), None);
        assert_eq!(filtered(&best_of(Value::Text("HLA-A*02:01".into()), Value::Null)), None);
    }
}

use std::collections::{BTreeMap, BTreeSet};

/// Samples of the description and the replicas registered for each, both sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleLayout {
    samples: Vec<(String, Vec<String>)>,
}

impl SampleLayout {
    /// Build a layout from (sample, replica) pairs in any order; duplicates collapse.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (sample, replica) in pairs {
            grouped.entry(sample.into()).or_default().insert(replica.into());
        }
        Self {
            samples: grouped
                .into_iter()
                .map(|(sample, replicas)| (sample, replicas.into_iter().collect()))
                .collect(),
        }
    }

    /// Sample names, sorted.
    pub fn sample_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.samples.iter().map(|(name, _)| name.as_str())
    }

    /// Samples with their sorted replicas.
    pub fn samples(&self) -> &[(String, Vec<String>)] {
        &self.samples
    }

    /// All (sample, replica) cells in matrix order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.samples
            .iter()
            .flat_map(|(sample, replicas)| replicas.iter().map(move |r| (sample.as_str(), r.as_str())))
    }

    /// Number of (sample, replica) cells.
    pub fn cell_count(&self) -> usize {
        self.samples.iter().map(|(_, replicas)| replicas.len()).sum()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the layout has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sorted_and_deduplicated() {
        let layout = SampleLayout::from_pairs([("S2", "R1"), ("S1", "R2"), ("S1", "R1"), ("S1", "R2")]);
        assert_eq!(layout.sample_names().collect::<Vec<_>>(), vec!["S1", "S2"]);
        assert_eq!(
            layout.cells().collect::<Vec<_>>(),
            vec![("S1", "R1"), ("S1", "R2"), ("S2", "R1")]
        );
        assert_eq!(layout.cell_count(), 3);
    }
}

use crate::profile::{FunctionRef, GraphProfile, SampleType};
use std::collections::{BTreeMap, HashMap, HashSet};

type Labels = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
struct FunctionTotals {
    totals: Vec<i64>,
    callers: Vec<FunctionRef>,
}

/// Inclusive per-function totals for every sample type of one profile. Samples
/// with different label sets are totalled separately.
#[derive(Debug)]
pub struct CumulativeAccumulator<'a> {
    sample_types: &'a [SampleType],
    functions: HashMap<(&'a Labels, &'a FunctionRef), FunctionTotals>,
}

/// One (label set, function, sample type) total.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeEntry<'a> {
    pub function: &'a FunctionRef,
    pub sample_type: &'a SampleType,
    /// Labels shared by the samples behind this total.
    pub labels: &'a Labels,
    pub total: i64,
    /// Callers of the function in the first sample that credited it, nearest
    /// caller first.
    pub callers: &'a [FunctionRef],
}

impl<'a> CumulativeAccumulator<'a> {
    /// Credits every distinct function of a sample's stack once with the full
    /// sample value, so recursion never inflates a total.
    pub fn accumulate(profile: &'a GraphProfile) -> Self {
        let mut functions: HashMap<(&'a Labels, &'a FunctionRef), FunctionTotals> =
            HashMap::new();
        let mut seen: HashSet<&'a FunctionRef> = HashSet::new();

        for sample in profile.samples.iter() {
            seen.clear();

            for (depth, function) in sample.frames.iter().enumerate() {
                if !seen.insert(function) {
                    continue;
                }

                let key = (&sample.labels, function);
                let entry = functions.entry(key).or_insert_with(|| FunctionTotals {
                    totals: vec![0; profile.sample_types.len()],
                    callers: sample.frames[depth + 1..].to_vec(),
                });

                for (total, value) in entry.totals.iter_mut().zip(sample.values.iter()) {
                    *total = total.saturating_add(*value);
                }
            }
        }

        Self {
            sample_types: &profile.sample_types,
            functions,
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len() * self.sample_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total of `function` across every label set.
    pub fn total(&self, function: &FunctionRef, sample_type: &str) -> Option<i64> {
        let idx = self.sample_types.iter().position(|st| st.name == sample_type)?;
        self.functions
            .iter()
            .filter(|((_, f), _)| *f == function)
            .map(|(_, t)| t.totals[idx])
            .reduce(i64::saturating_add)
    }

    /// All totals, ordered by function, then sample type name, then labels.
    pub fn entries(&self) -> Vec<CumulativeEntry<'_>> {
        let mut entries = Vec::with_capacity(self.len());
        for ((labels, function), totals) in self.functions.iter() {
            for (idx, sample_type) in self.sample_types.iter().enumerate() {
                entries.push(CumulativeEntry {
                    function,
                    sample_type,
                    labels,
                    total: totals.totals[idx],
                    callers: &totals.callers,
                });
            }
        }

        entries.sort_by(|a, b| {
            a.function
                .cmp(b.function)
                .then_with(|| a.sample_type.name.cmp(&b.sample_type.name))
                .then_with(|| a.labels.cmp(b.labels))
        });
        entries
    }
}

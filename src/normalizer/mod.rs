mod cumulative;
mod record;
mod utils;

pub use cumulative::{CumulativeAccumulator, CumulativeEntry};
pub use record::{Record, DATA_TYPE_CALL_STACK};
pub use utils::{format_val, record_type, RECORD_TYPES};

use crate::config::GraphStackMode;
use crate::error::DecodeError;
use crate::metadata::InputMeta;
use crate::trie::TrieEntry;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
const TRIE_UNITS: &str = "nanoseconds";
const TRIE_DEFAULT_VALUE_TYPE: &str = "cpu";

/// Turns decoded entries of one request into records, stamping each with the
/// request's metadata.
#[derive(Debug)]
pub struct Normalizer<'a> {
    meta: &'a InputMeta,
    graph_stack: GraphStackMode,
    profile_id: String,
    labels: String,
}

impl<'a> Normalizer<'a> {
    pub fn new(meta: &'a InputMeta, graph_stack: GraphStackMode) -> Result<Self, DecodeError> {
        let labels = serde_json::to_string(&meta.labels)
            .map_err(|e| DecodeError::metadata(format!("failed to serialize labels: {}", e)))?;

        Ok(Self {
            meta,
            graph_stack,
            profile_id: ulid::Ulid::new().to_string(),
            labels,
        })
    }

    fn record(&self, name: String, stack: String, stack_id: String) -> Record {
        Record {
            profile_id: self.profile_id.clone(),
            stack_id,
            name,
            stack,
            language: self.meta.language.clone(),
            profile_type: String::new(),
            units: String::new(),
            value_types: String::new(),
            agg_types: self.meta.aggregation_type.clone(),
            data_type: DATA_TYPE_CALL_STACK,
            duration_ns: 0,
            labels: self.labels.clone(),
            val: 0.0,
            time: self.meta.from,
        }
    }

    /// Trie counts are samples taken at `sampleRate` Hz, so each one stands
    /// for `1e9 / sampleRate` nanoseconds.
    pub fn trie_record(&self, entry: &TrieEntry) -> Record {
        let value_type = match self.meta.value_type.as_str() {
            "" => TRIE_DEFAULT_VALUE_TYPE,
            vt => vt,
        };

        let stack = entry
            .callers()
            .iter()
            .rev()
            .map(|s| String::from_utf8_lossy(s))
            .collect::<Vec<_>>()
            .join("\n");

        Record {
            profile_type: record_type(value_type),
            units: TRIE_UNITS.to_string(),
            value_types: value_type.to_string(),
            duration_ns: self.meta.duration_ns(),
            val: entry.value as f64 * NANOS_PER_SECOND / f64::from(self.meta.sample_rate),
            ..self.record(
                String::from_utf8_lossy(entry.leaf()).into_owned(),
                stack,
                utils::stack_id(entry.path.iter().map(Vec::as_slice)),
            )
        }
    }

    /// Sample labels are added to the request labels without replacing any of
    /// them.
    pub fn cumulative_record(
        &self,
        entry: &CumulativeEntry<'_>,
        duration_nanos: i64,
    ) -> Result<Record, DecodeError> {
        let stack = match self.graph_stack {
            GraphStackMode::Callers => entry
                .callers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            GraphStackMode::Omit => String::new(),
        };

        let name = entry.function.to_string();
        let frames: Vec<String> = entry
            .callers
            .iter()
            .rev()
            .map(ToString::to_string)
            .chain(std::iter::once(name.clone()))
            .collect();

        let labels = if entry.labels.is_empty() {
            self.labels.clone()
        } else {
            let mut merged = self.meta.labels.clone();
            for (k, v) in entry.labels.iter() {
                merged.entry(k.clone()).or_insert_with(|| v.clone());
            }
            serde_json::to_string(&merged).map_err(|e| {
                DecodeError::MalformedProfile(format!("failed to serialize sample labels: {}", e))
            })?
        };

        Ok(Record {
            profile_type: record_type(&entry.sample_type.name),
            units: entry.sample_type.unit.clone(),
            value_types: entry.sample_type.name.clone(),
            duration_ns: duration_nanos.max(0) as u64,
            labels,
            val: entry.total as f64,
            ..self.record(
                name,
                stack,
                utils::stack_id(frames.iter().map(String::as_bytes)),
            )
        })
    }
}

use super::utils::format_val;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const DATA_TYPE_CALL_STACK: &str = "CallStack";

/// One normalized profiling record, the unit handed to the downstream
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Shared by every record decoded from the same request.
    pub profile_id: String,
    pub stack_id: String,
    pub name: String,
    pub stack: String,
    pub language: String,
    pub profile_type: String,
    pub units: String,
    pub value_types: String,
    pub agg_types: String,
    pub data_type: &'static str,
    pub duration_ns: u64,
    /// JSON object with sorted keys.
    pub labels: String,
    pub val: f64,
    /// Epoch seconds the record is filed under.
    pub time: u64,
}

impl Record {
    /// The flat key/value contents of the record, in wire order.
    pub fn contents(&self) -> Vec<(&'static str, String)> {
        vec![
            ("profileID", self.profile_id.clone()),
            ("stackID", self.stack_id.clone()),
            ("name", self.name.clone()),
            ("stack", self.stack.clone()),
            ("language", self.language.clone()),
            ("type", self.profile_type.clone()),
            ("units", self.units.clone()),
            ("valueTypes", self.value_types.clone()),
            ("aggTypes", self.agg_types.clone()),
            ("dataType", self.data_type.to_string()),
            ("durationNs", self.duration_ns.to_string()),
            ("labels", self.labels.clone()),
            ("val", format_val(self.val)),
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.contents()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let contents = self.contents();
        let mut map = serializer.serialize_map(Some(contents.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (k, v) in contents.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

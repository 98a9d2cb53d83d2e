mod resolve;

use crate::error::DecodeError;
use crate::pprofpb::Profile;
use crate::reader;
use prost::Message;
use resolve::Resolver;
use std::collections::BTreeMap;
use std::fmt;

/// Resolved identity of a call-graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionRef {
    pub name: String,
    pub file: String,
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, self.file)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleType {
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphSample {
    /// Innermost frame first.
    pub frames: Vec<FunctionRef>,
    /// One value per entry of [`GraphProfile::sample_types`].
    pub values: Vec<i64>,
    /// String labels attached to the sample. Numeric labels are dropped.
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphProfile {
    pub sample_types: Vec<SampleType>,
    pub samples: Vec<GraphSample>,
    pub duration_nanos: i64,
}

/// Decodes a pprof payload, inflating it first when it carries a gzip header,
/// and resolves every sample's locations to function/file pairs.
pub fn decode_profile(buf: &[u8], max_decompressed_bytes: usize) -> Result<GraphProfile, DecodeError> {
    let data = reader::decompress(buf, max_decompressed_bytes).map_err(DecodeError::profile)?;

    let p = Profile::decode(data.as_ref())
        .map_err(|e| DecodeError::MalformedProfile(format!("failed to decode profile: {}", e)))?;

    if p.sample_type.is_empty() {
        return Err(DecodeError::MalformedProfile(
            "profile declares no sample types".to_string(),
        ));
    }

    let mut resolver = Resolver::new(&p);

    let sample_types = p
        .sample_type
        .iter()
        .map(|st| {
            Ok(SampleType {
                name: resolver.string(st.r#type)?.to_string(),
                unit: resolver.string(st.unit)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    let mut samples = Vec::with_capacity(p.sample.len());
    for (i, sample) in p.sample.iter().enumerate() {
        if sample.value.len() != sample_types.len() {
            return Err(DecodeError::MalformedProfile(format!(
                "sample {} has {} values, expected {}",
                i,
                sample.value.len(),
                sample_types.len()
            )));
        }

        let mut labels = BTreeMap::new();
        for label in sample.label.iter().filter(|l| l.str != 0) {
            let key = resolver.string(label.key)?;
            if !key.is_empty() {
                labels.insert(key.to_string(), resolver.string(label.str)?.to_string());
            }
        }

        samples.push(GraphSample {
            frames: resolver.stack(&sample.location_id)?,
            values: sample.value.clone(),
            labels,
        });
    }

    log::debug!(
        "decoded pprof profile with {} samples over {} sample types",
        samples.len(),
        sample_types.len()
    );

    Ok(GraphProfile {
        sample_types,
        samples,
        duration_nanos: p.duration_nanos,
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::pprofpb::{Function, Label, Line, Location, Profile, Sample, ValueType};

    /// Builds pprof messages with one location per function.
    #[derive(Default)]
    pub(crate) struct ProfileBuilder {
        p: Profile,
    }

    impl ProfileBuilder {
        pub(crate) fn new(sample_types: &[(&str, &str)]) -> Self {
            let mut b = Self::default();
            b.p.string_table.push(String::new());
            for (name, unit) in sample_types {
                let vt = ValueType {
                    r#type: b.string(name),
                    unit: b.string(unit),
                };
                b.p.sample_type.push(vt);
            }
            b
        }

        pub(crate) fn string(&mut self, s: &str) -> i64 {
            if let Some(i) = self.p.string_table.iter().position(|x| x == s) {
                return i as i64;
            }
            self.p.string_table.push(s.to_string());
            (self.p.string_table.len() - 1) as i64
        }

        /// Registers a function and a location for it, returning the location id.
        pub(crate) fn function(&mut self, name: &str, file: &str) -> u64 {
            let id = self.p.function.len() as u64 + 1;
            let function = Function {
                id,
                name: self.string(name),
                system_name: 0,
                filename: self.string(file),
                start_line: 0,
            };
            self.p.function.push(function);
            self.p.location.push(Location {
                id,
                line: vec![Line {
                    function_id: id,
                    line: 1,
                    column: 0,
                }],
                ..Default::default()
            });
            id
        }

        pub(crate) fn sample(&mut self, location_ids: &[u64], values: &[i64]) -> &mut Self {
            self.p.sample.push(Sample {
                location_id: location_ids.to_vec(),
                value: values.to_vec(),
                label: vec![],
            });
            self
        }

        pub(crate) fn labelled_sample(
            &mut self,
            location_ids: &[u64],
            values: &[i64],
            labels: &[(&str, &str)],
        ) -> &mut Self {
            let label = labels
                .iter()
                .map(|(k, v)| Label {
                    key: self.string(k),
                    str: self.string(v),
                    ..Default::default()
                })
                .collect();
            self.p.sample.push(Sample {
                location_id: location_ids.to_vec(),
                value: values.to_vec(),
                label,
            });
            self
        }

        pub(crate) fn profile_mut(&mut self) -> &mut Profile {
            &mut self.p
        }

        pub(crate) fn encode(&self) -> Vec<u8> {
            use prost::Message;
            self.p.encode_to_vec()
        }
    }
}

use super::FunctionRef;
use crate::error::DecodeError;
use crate::pprofpb::{Function, Location, Profile};
use std::collections::HashMap;

/// Id indexed view over the tables of one pprof message.
pub(crate) struct Resolver<'a> {
    string_table: &'a [String],
    functions: HashMap<u64, &'a Function>,
    locations: HashMap<u64, &'a Location>,
    resolved: HashMap<u64, Vec<FunctionRef>>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(p: &'a Profile) -> Self {
        Self {
            string_table: p.string_table.as_slice(),
            functions: p.function.iter().map(|f| (f.id, f)).collect(),
            locations: p.location.iter().map(|l| (l.id, l)).collect(),
            resolved: HashMap::with_capacity(p.location.len()),
        }
    }

    pub(crate) fn string(&self, idx: i64) -> Result<&'a str, DecodeError> {
        usize::try_from(idx)
            .ok()
            .and_then(|i| self.string_table.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                DecodeError::MalformedProfile(format!(
                    "string index {} out of range (table has {} entries)",
                    idx,
                    self.string_table.len()
                ))
            })
    }

    fn function(&self, function_id: u64) -> Result<FunctionRef, DecodeError> {
        let f = self.functions.get(&function_id).ok_or_else(|| {
            DecodeError::MalformedProfile(format!("unknown function id {}", function_id))
        })?;

        Ok(FunctionRef {
            name: self.string(f.name)?.to_string(),
            file: self.string(f.filename)?.to_string(),
        })
    }

    /// Frames of one location, innermost (inlined) first.
    fn location(&self, location_id: u64) -> Result<Vec<FunctionRef>, DecodeError> {
        let location = self.locations.get(&location_id).ok_or_else(|| {
            DecodeError::MalformedProfile(format!("unknown location id {}", location_id))
        })?;

        if location.line.is_empty() {
            return Ok(vec![FunctionRef {
                name: format!("{:#x}", location.address),
                file: String::new(),
            }]);
        }

        location
            .line
            .iter()
            .map(|line| self.function(line.function_id))
            .collect()
    }

    /// Expands a sample's location ids into its full stack, innermost first.
    pub(crate) fn stack(&mut self, location_ids: &[u64]) -> Result<Vec<FunctionRef>, DecodeError> {
        let mut frames = Vec::with_capacity(location_ids.len());

        for id in location_ids {
            if !self.resolved.contains_key(id) {
                let resolved = self.location(*id)?;
                self.resolved.insert(*id, resolved);
            }
            if let Some(resolved) = self.resolved.get(id) {
                frames.extend(resolved.iter().cloned());
            }
        }

        Ok(frames)
    }
}

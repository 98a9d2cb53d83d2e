mod name;
mod spy;

pub use name::SeriesName;
pub use spy::{language_of, SPY_LANGUAGES, UNKNOWN_SPY};

use crate::error::DecodeError;
use http::request::Parts;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

pub const NAME_LABEL: &str = "__name__";

const DEFAULT_AGGREGATION_TYPE: &str = "sum";
const DEFAULT_SAMPLE_RATE: u32 = 100;
const DEFAULT_UNITS: &str = "samples";
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Query string of a request, URL decoded. Repeated keys keep the last value.
pub fn query_params(parts: &Parts) -> HashMap<String, String> {
    parts.uri.query().map_or_else(HashMap::default, |q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
}

/// Everything the ingest query string says about a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMeta {
    pub aggregation_type: String,
    pub metric_name: String,
    pub value_type: String,
    pub labels: BTreeMap<String, String>,
    pub spy_name: String,
    pub language: String,
    pub units: String,
    pub sample_rate: u32,
    pub from: u64,
    pub until: u64,
}

impl InputMeta {
    /// Builds the metadata from query parameters. `extra_tags` are merged into
    /// the labels last and win over selector keys; `__name__` always holds the
    /// application name.
    pub fn parse(
        query: &HashMap<String, String>,
        extra_tags: &HashMap<String, String>,
    ) -> Result<Self, DecodeError> {
        let raw_name = query
            .get("name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DecodeError::metadata("missing name parameter"))?;
        let name = SeriesName::parse(raw_name)?;

        let sample_rate = optional_number(query, "sampleRate")?.unwrap_or(DEFAULT_SAMPLE_RATE);
        if sample_rate == 0 {
            return Err(DecodeError::metadata("sampleRate must be positive"));
        }

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let from = optional_number(query, "from")?.unwrap_or(now);
        let until = optional_number(query, "until")?.unwrap_or(now);
        if until < from {
            return Err(DecodeError::metadata(format!(
                "until ({}) is before from ({})",
                until, from
            )));
        }

        let spy_name = query.get("spyName").cloned().unwrap_or_default();
        let language = language_of(&spy_name).to_string();

        let mut labels: BTreeMap<String, String> = name.selector.into_iter().collect();
        labels.extend(extra_tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        labels.insert(NAME_LABEL.to_string(), name.metric_name.clone());

        Ok(Self {
            aggregation_type: non_empty_or(query, "aggregationType", DEFAULT_AGGREGATION_TYPE),
            metric_name: name.metric_name,
            value_type: name.value_type,
            labels,
            spy_name,
            language,
            units: non_empty_or(query, "units", DEFAULT_UNITS),
            sample_rate,
            from,
            until,
        })
    }

    pub fn duration_ns(&self) -> u64 {
        (self.until - self.from).saturating_mul(NANOS_PER_SECOND)
    }
}

fn non_empty_or(query: &HashMap<String, String>, key: &str, default: &str) -> String {
    query
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn optional_number<T: FromStr>(
    query: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, DecodeError> {
    match query.get(key).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            DecodeError::metadata(format!("{} must be a non-negative integer, got {:?}", key, raw))
        }),
    }
}

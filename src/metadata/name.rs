use crate::error::DecodeError;

/// A parsed `name` query parameter: `<metric>.<valueType>{k=v,...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeriesName {
    pub metric_name: String,
    pub value_type: String,
    pub selector: Vec<(String, String)>,
}

impl SeriesName {
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        let (head, selector) = match raw.find('{') {
            Some(open) => (&raw[..open], parse_selector(&raw[open..])?),
            None => (raw, Vec::new()),
        };

        if head.contains('}') {
            return Err(DecodeError::metadata(format!(
                "name {:?} has '}}' without a matching '{{'",
                raw
            )));
        }

        let head = head.trim();
        let (metric_name, value_type) = match head.rfind('.') {
            Some(dot) => (&head[..dot], &head[dot + 1..]),
            None => (head, ""),
        };

        if metric_name.is_empty() {
            return Err(DecodeError::metadata(format!(
                "name {:?} has an empty application name",
                raw
            )));
        }

        Ok(Self {
            metric_name: metric_name.to_string(),
            value_type: value_type.to_string(),
            selector,
        })
    }
}

/// Parses `{k=v,...}`, braces included.
fn parse_selector(raw: &str) -> Result<Vec<(String, String)>, DecodeError> {
    let close = raw
        .find('}')
        .ok_or_else(|| DecodeError::metadata(format!("selector {:?} is missing '}}'", raw)))?;

    if !raw[close + 1..].trim().is_empty() {
        return Err(DecodeError::metadata(format!(
            "unexpected text after selector {:?}",
            raw
        )));
    }

    let body = raw[1..close].trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split(',')
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DecodeError::metadata(format!("selector pair {:?} is missing '='", pair))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(DecodeError::metadata(format!(
                    "selector pair {:?} has an empty key",
                    pair
                )));
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

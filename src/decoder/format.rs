use crate::error::DecodeError;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Trie,
    Lines,
    Pprof,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Trie => "trie",
            Format::Lines => "lines",
            Format::Pprof => "pprof",
        })
    }
}

impl Format {
    fn from_marker(marker: &str) -> Result<Self, DecodeError> {
        match marker.trim().to_ascii_lowercase().as_str() {
            "trie" => Ok(Format::Trie),
            "lines" => Ok(Format::Lines),
            "pprof" => Ok(Format::Pprof),
            other => Err(DecodeError::UnsupportedFormat(other.to_string())),
        }
    }

    /// An explicit `format` query parameter wins; otherwise a `+marker`
    /// suffix on the content type picks the format, and a plain binary body
    /// is treated as pprof.
    pub fn detect(
        query: &HashMap<String, String>,
        headers: &HeaderMap,
    ) -> Result<Self, DecodeError> {
        if let Some(format) = query.get("format").filter(|f| !f.is_empty()) {
            return Self::from_marker(format);
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let mime = content_type.split(';').next().unwrap_or_default();

        match mime.rsplit_once('+') {
            Some((_, marker)) => Self::from_marker(marker),
            None => Ok(Format::Pprof),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(ct) = content_type {
            h.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        h
    }

    fn query(format: Option<&str>) -> HashMap<String, String> {
        format
            .map(|f| HashMap::from([("format".to_string(), f.to_string())]))
            .unwrap_or_default()
    }

    #[test]
    fn test_content_type_markers() {
        let q = query(None);
        assert_eq!(
            Format::detect(&q, &headers(Some("binary/octet-stream+trie"))).unwrap(),
            Format::Trie
        );
        assert_eq!(
            Format::detect(&q, &headers(Some("binary/octet-stream+lines; charset=utf-8"))).unwrap(),
            Format::Lines
        );
        assert_eq!(
            Format::detect(&q, &headers(Some("binary/octet-stream"))).unwrap(),
            Format::Pprof
        );
        assert_eq!(Format::detect(&q, &headers(None)).unwrap(), Format::Pprof);
    }

    #[test]
    fn test_unknown_markers() {
        let q = query(None);
        for ct in ["binary/octet-stream+tree", "binary/octet-stream+jfr"] {
            assert!(matches!(
                Format::detect(&q, &headers(Some(ct))),
                Err(DecodeError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_query_override() {
        let h = headers(Some("binary/octet-stream+trie"));
        assert_eq!(Format::detect(&query(Some("pprof")), &h).unwrap(), Format::Pprof);
        assert_eq!(Format::detect(&query(Some("lines")), &h).unwrap(), Format::Lines);
        assert!(matches!(
            Format::detect(&query(Some("jfr")), &h),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }
}

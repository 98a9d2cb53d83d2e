mod format;
mod lines;
mod multipart;

pub use format::Format;
pub use lines::decode_lines;
pub use multipart::{form_boundary, profile_part, PROFILE_FIELD};

use crate::config::{DecoderConfig, GraphStackMode};
use crate::error::DecodeError;
use crate::metadata::{query_params, InputMeta};
use crate::normalizer::{CumulativeAccumulator, Normalizer, Record};
use crate::profile::decode_profile;
use crate::trie::decode_trie;
use bytes::Bytes;
use http::request::Parts;
use std::borrow::Cow;
use std::collections::HashMap;

/// One wire encoding of profiling samples.
pub trait Decoder {
    fn decode(&self, body: &[u8], meta: &InputMeta) -> Result<Vec<Record>, DecodeError>;
}

#[derive(Debug, Default)]
pub struct TrieDecoder;

impl Decoder for TrieDecoder {
    fn decode(&self, body: &[u8], meta: &InputMeta) -> Result<Vec<Record>, DecodeError> {
        let entries = decode_trie(body)?;
        let normalizer = Normalizer::new(meta, GraphStackMode::default())?;
        Ok(entries.iter().map(|e| normalizer.trie_record(e)).collect())
    }
}

#[derive(Debug, Default)]
pub struct LinesDecoder;

impl Decoder for LinesDecoder {
    fn decode(&self, body: &[u8], meta: &InputMeta) -> Result<Vec<Record>, DecodeError> {
        let entries = decode_lines(body)?;
        let normalizer = Normalizer::new(meta, GraphStackMode::default())?;
        Ok(entries.iter().map(|e| normalizer.trie_record(e)).collect())
    }
}

#[derive(Debug, Default)]
pub struct PprofDecoder {
    config: DecoderConfig,
}

impl PprofDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }
}

impl Decoder for PprofDecoder {
    fn decode(&self, body: &[u8], meta: &InputMeta) -> Result<Vec<Record>, DecodeError> {
        let profile = decode_profile(body, self.config.max_decompressed_bytes)?;
        let accumulator = CumulativeAccumulator::accumulate(&profile);
        let normalizer = Normalizer::new(meta, self.config.graph_stack)?;

        accumulator
            .entries()
            .iter()
            .map(|e| normalizer.cumulative_record(e, profile.duration_nanos))
            .collect()
    }
}

/// Entry point for one ingest request: parses the query, picks the decoder
/// for the declared format and normalizes whatever it decodes.
#[derive(Debug, Default)]
pub struct ProfileDecoder {
    trie: TrieDecoder,
    lines: LinesDecoder,
    pprof: PprofDecoder,
}

impl ProfileDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            trie: TrieDecoder,
            lines: LinesDecoder,
            pprof: PprofDecoder::new(config),
        }
    }

    pub fn decoder_for(&self, format: Format) -> &dyn Decoder {
        match format {
            Format::Trie => &self.trie,
            Format::Lines => &self.lines,
            Format::Pprof => &self.pprof,
        }
    }

    /// Decodes one request. A pprof profile uploaded as a `multipart/form-data`
    /// form is taken from its `profile` part.
    pub async fn decode(
        &self,
        body: &[u8],
        parts: &Parts,
        extra_tags: &HashMap<String, String>,
    ) -> Result<Vec<Record>, DecodeError> {
        let query = query_params(parts);
        let format = Format::detect(&query, &parts.headers)?;
        let meta = InputMeta::parse(&query, extra_tags)?;

        let payload = match form_boundary(&parts.headers)? {
            Some(boundary) if format == Format::Pprof => {
                let part = profile_part(Bytes::copy_from_slice(body), &boundary).await?;
                Cow::Owned(part.to_vec())
            }
            _ => Cow::Borrowed(body),
        };

        let records = self.decoder_for(format).decode(&payload, &meta)?;
        log::debug!(
            "decoded {} bytes of {} for {} into {} records",
            payload.len(),
            format,
            meta.metric_name,
            records.len()
        );
        Ok(records)
    }
}

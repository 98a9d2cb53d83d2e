//! Decoding of continuous-profiling payloads sent by Pyroscope compatible
//! agents into flat, normalized records.
//!
//! Two wire encodings are understood: the prefix-compressed transport trie of
//! `;` joined stacks (plus its plain `lines` sibling) and gzip'd or raw pprof
//! profiles, the latter also as the `profile` part of a multipart form.
//! [`ProfileDecoder`] picks one from the request and returns one [`Record`]
//! per stack (trie) or per function, sample type and label set (pprof).

pub mod config;
pub mod decoder;
pub mod error;
pub mod metadata;
pub mod normalizer;
pub mod pprofpb;
pub mod profile;
pub mod reader;
pub mod trie;

pub use config::{DecoderConfig, GraphStackMode};
pub use decoder::{Decoder, Format, LinesDecoder, PprofDecoder, ProfileDecoder, TrieDecoder};
pub use error::DecodeError;
pub use metadata::InputMeta;
pub use normalizer::Record;

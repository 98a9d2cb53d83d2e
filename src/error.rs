use crate::reader::ReadError;

/// Terminal failure for a single ingest request. No partial batch is ever
/// returned alongside one of these.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed trie: {0}")]
    MalformedTrie(String),
    #[error("malformed profile: {0}")]
    MalformedProfile(String),
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl DecodeError {
    pub(crate) fn trie(e: ReadError) -> Self {
        Self::MalformedTrie(e.to_string())
    }

    pub(crate) fn profile(e: ReadError) -> Self {
        Self::MalformedProfile(e.to_string())
    }

    pub(crate) fn metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

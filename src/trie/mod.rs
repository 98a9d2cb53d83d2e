mod builder;

pub use builder::TrieBuilder;

use crate::error::DecodeError;
use crate::reader::ByteReader;

pub const SEPARATOR: u8 = b';';

/// One counted key of a transport trie, split into its `;` separated frames
/// with the outermost call first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieEntry {
    pub path: Vec<Vec<u8>>,
    pub value: u64,
}

impl TrieEntry {
    pub fn new(key: &[u8], value: u64) -> Self {
        Self {
            path: key.split(|b| *b == SEPARATOR).map(<[u8]>::to_vec).collect(),
            value,
        }
    }

    pub fn leaf(&self) -> &[u8] {
        self.path.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// Frames above the leaf, outermost first.
    pub fn callers(&self) -> &[Vec<u8>] {
        match self.path.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

#[derive(Debug)]
struct PendingChildren {
    prefix_len: usize,
    remaining: u64,
}

/// Lazy pre-order walk over a serialized transport trie.
///
/// Every node is `uvarint(len) fragment uvarint(value) uvarint(children)`
/// followed by its children. A node is yielded when it carries a value or has
/// no children; a childless zero is an explicit zero count. The lone root of
/// an empty trie yields nothing.
/// The walk keeps its own stack of unfinished parents so that nesting depth is
/// bounded by the heap, not the thread stack. Once an error has been yielded
/// the iterator is exhausted.
#[derive(Debug)]
pub struct TrieEntries<'a> {
    reader: ByteReader<'a>,
    pending: Vec<PendingChildren>,
    key: Vec<u8>,
    started: bool,
    done: bool,
}

impl<'a> TrieEntries<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(buf),
            pending: Vec::new(),
            key: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// Positions the key buffer for the next node to read. Returns false when
    /// the walk is complete.
    fn advance(&mut self) -> Result<bool, DecodeError> {
        if !self.started {
            self.started = true;
            return Ok(!self.reader.is_empty());
        }

        while matches!(self.pending.last(), Some(p) if p.remaining == 0) {
            self.pending.pop();
        }

        match self.pending.last_mut() {
            Some(parent) => {
                parent.remaining -= 1;
                self.key.truncate(parent.prefix_len);
                Ok(true)
            }
            None if self.reader.is_empty() => Ok(false),
            None => Err(DecodeError::MalformedTrie(format!(
                "{} trailing bytes after root node at offset {}",
                self.reader.remaining(),
                self.reader.position()
            ))),
        }
    }

    /// Reads one node, returning its value and whether it is a leaf.
    fn read_node(&mut self) -> Result<(u64, bool), DecodeError> {
        let fragment = self.reader.read_prefixed().map_err(DecodeError::trie)?;
        self.key.extend_from_slice(fragment);

        let value = self.reader.read_uvarint().map_err(DecodeError::trie)?;
        let children = self.reader.read_uvarint().map_err(DecodeError::trie)?;

        // every child takes at least three bytes on the wire
        if children > (self.reader.remaining() / 3) as u64 {
            return Err(DecodeError::MalformedTrie(format!(
                "node at offset {} declares {} children but only {} bytes remain",
                self.reader.position(),
                children,
                self.reader.remaining()
            )));
        }

        if children > 0 {
            self.pending.push(PendingChildren {
                prefix_len: self.key.len(),
                remaining: children,
            });
        }

        Ok((value, children == 0))
    }

    fn step(&mut self) -> Result<Option<TrieEntry>, DecodeError> {
        while self.advance()? {
            let is_root = self.reader.position() == 0;
            let (value, is_leaf) = self.read_node()?;
            if value > 0 || (is_leaf && !is_root) {
                return Ok(Some(TrieEntry::new(&self.key, value)));
            }
        }
        Ok(None)
    }
}

impl Iterator for TrieEntries<'_> {
    type Item = Result<TrieEntry, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes every counted key of `buf`, failing the whole buffer on the first
/// structural error.
pub fn decode_trie(buf: &[u8]) -> Result<Vec<TrieEntry>, DecodeError> {
    TrieEntries::new(buf).collect()
}

use crate::error::DecodeError;
use crate::trie::TrieEntry;
use std::collections::HashMap;

/// Decodes the plain-text `lines` format: one `;` joined stack per line, each
/// line a single sample. Repeated stacks are summed and reported in order of
/// first appearance.
pub fn decode_lines(body: &[u8]) -> Result<Vec<TrieEntry>, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|e| {
        DecodeError::MalformedTrie(format!("lines payload is not valid utf-8: {}", e))
    })?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<TrieEntry> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match index.get(line) {
            Some(i) => entries[*i].value += 1,
            None => {
                index.insert(line, entries.len());
                entries.push(TrieEntry::new(line.as_bytes(), 1));
            }
        }
    }

    Ok(entries)
}

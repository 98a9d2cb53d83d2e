use crate::reader::write_uvarint;

#[derive(Debug, Default)]
struct Node {
    fragment: Vec<u8>,
    value: u64,
    children: Vec<Node>,
}

impl Node {
    fn leaf(fragment: &[u8], value: u64) -> Self {
        Self {
            fragment: fragment.to_vec(),
            value,
            children: Vec::new(),
        }
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Prefix-compressed trie in the layout agents put on the wire. Children are
/// kept sorted by fragment, so serialization order is the lexicographic order
/// of the keys.
#[derive(Debug, Default)]
pub struct TrieBuilder {
    root: Node,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the count stored under `key`.
    pub fn insert(&mut self, key: &[u8], value: u64) {
        let mut node = &mut self.root;
        let mut rest = key;

        loop {
            if rest.is_empty() {
                node.value += value;
                return;
            }

            // siblings never share a first byte
            let pos = node
                .children
                .binary_search_by(|c| c.fragment[0].cmp(&rest[0]));

            let idx = match pos {
                Err(idx) => {
                    node.children.insert(idx, Node::leaf(rest, value));
                    return;
                }
                Ok(idx) => idx,
            };

            let shared = common_prefix(&node.children[idx].fragment, rest);
            if shared < node.children[idx].fragment.len() {
                let child = &mut node.children[idx];
                let suffix = child.fragment.split_off(shared);
                let split = Node {
                    fragment: suffix,
                    value: child.value,
                    children: std::mem::take(&mut child.children),
                };
                child.value = 0;
                child.children.push(split);
            }

            node = &mut node.children[idx];
            rest = &rest[shared..];
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut stack = vec![&self.root];

        while let Some(node) = stack.pop() {
            write_uvarint(&mut buf, node.fragment.len() as u64);
            buf.extend_from_slice(&node.fragment);
            write_uvarint(&mut buf, node.value);
            write_uvarint(&mut buf, node.children.len() as u64);
            stack.extend(node.children.iter().rev());
        }

        buf
    }
}

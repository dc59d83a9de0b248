//! Reference-counted prefix trie
//!
//! A multiset of strings keyed character by character. Each node counts how
//! many indexed copies of a word end there, so two entities sharing a name can
//! be removed one at a time. Nodes live in an arena and are never compacted on
//! removal; the whole trie is cheap to discard and rebuild instead.

use std::collections::BTreeMap;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    ch: char,
    /// Number of indexed copies of the word ending at this node
    count: u32,
    children: BTreeMap<char, usize>,
}

/// Prefix tree with per-word reference counts
#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    words: usize,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            words: 0,
        }
    }

    /// Number of distinct words with a positive count
    pub fn len(&self) -> usize {
        self.words
    }

    /// True if no word has a positive count
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Number of allocated nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT].children.clear();
        self.nodes[ROOT].count = 0;
        self.words = 0;
    }

    /// Add one copy of `word`. Empty words are ignored and return false.
    pub fn insert(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        let mut current = ROOT;
        for ch in word.chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode {
                        ch,
                        ..TrieNode::default()
                    });
                    self.nodes[current].children.insert(ch, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[current];
        if node.count == 0 {
            self.words += 1;
        }
        node.count = node.count.saturating_add(1);
        true
    }

    /// Remove `word`.
    ///
    /// With `decrement_only` a single copy is removed, otherwise the count is
    /// reset to zero. Returns false when the word is not present.
    pub fn remove(&mut self, word: &str, decrement_only: bool) -> bool {
        let Some(id) = self.find_node(word) else {
            return false;
        };

        let node = &mut self.nodes[id];
        if node.count == 0 {
            return false;
        }

        if decrement_only {
            node.count -= 1;
        } else {
            node.count = 0;
        }
        if node.count == 0 {
            self.words -= 1;
        }
        true
    }

    /// True if `word` is indexed with a positive count
    pub fn contains_exact(&self, word: &str) -> bool {
        self.count(word) > 0
    }

    /// Number of indexed copies of `word`
    pub fn count(&self, word: &str) -> u32 {
        self.find_node(word)
            .map(|id| self.nodes[id].count)
            .unwrap_or(0)
    }

    /// Longest indexed word that is a prefix of `input`.
    ///
    /// The match is anchored at the start of `input`; the returned slice
    /// borrows from it.
    pub fn longest_prefix_match<'a>(&self, input: &'a str) -> Option<&'a str> {
        let mut current = ROOT;
        let mut best = None;

        for (offset, ch) in input.char_indices() {
            let Some(&child) = self.nodes[current].children.get(&ch) else {
                break;
            };
            current = child;
            if self.nodes[current].count > 0 {
                best = Some(offset + ch.len_utf8());
            }
        }

        best.map(|end| &input[..end])
    }

    /// All indexed words with their counts, in character order
    pub fn words(&self) -> Vec<(String, u32)> {
        let mut out = Vec::with_capacity(self.words);
        // (node, depth) pairs; children pushed in reverse to pop in order
        let mut stack: Vec<(usize, usize)> = self.nodes[ROOT]
            .children
            .values()
            .rev()
            .map(|&id| (id, 0))
            .collect();
        let mut prefix: Vec<char> = Vec::new();

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            prefix.truncate(depth);
            prefix.push(node.ch);
            if node.count > 0 {
                out.push((prefix.iter().collect(), node.count));
            }
            stack.extend(node.children.values().rev().map(|&child| (child, depth + 1)));
        }

        out
    }

    fn find_node(&self, word: &str) -> Option<usize> {
        if word.is_empty() {
            return None;
        }
        word.chars().try_fold(ROOT, |current, ch| {
            self.nodes[current].children.get(&ch).copied()
        })
    }
}

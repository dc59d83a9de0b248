//! Name index over the entity collection
//!
//! Owns one [`PrefixTrie`] holding, for every Notebook and Note, its name, the
//! name with the first character lowercased, and its abbreviation. The index
//! is derived state: it can always be discarded and rebuilt from the catalog.

use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

use crate::entity::{lowercase_first, Entity};
use crate::trie::PrefixTrie;

/// Words the index answers to, derived from entity names
#[derive(Debug, Clone)]
pub struct NameIndex {
    trie: PrefixTrie,
    denylist: BTreeSet<String>,
    generation: u64,
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::new(autolink_config::DEFAULT_DENYLIST.iter().copied())
    }
}

impl NameIndex {
    /// Create an empty index that never holds any word from `denylist`
    pub fn new<I, S>(denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trie: PrefixTrie::new(),
            denylist: denylist.into_iter().map(Into::into).collect(),
            generation: 0,
        }
    }

    /// Replace the index contents with words derived from `entities`.
    ///
    /// Tags are skipped. Denylisted words are fully removed after insertion,
    /// even when an entity carries one as its name.
    pub fn rebuild<'a, I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let start = Instant::now();
        self.trie.clear();

        let mut indexed = 0usize;
        for entity in entities {
            if !entity.kind.is_autolinkable() || entity.name.is_empty() {
                continue;
            }
            self.trie.insert(&entity.name);
            self.trie.insert(&lowercase_first(&entity.name));
            if let Some(abbreviation) = entity.abbreviation() {
                self.trie.insert(abbreviation);
            }
            indexed += 1;
        }

        for denied in &self.denylist {
            self.trie.remove(denied, false);
        }

        self.generation += 1;
        debug!(
            "Rebuilt name index generation {} from {} entities ({} words) in {:?}",
            self.generation,
            indexed,
            self.trie.len(),
            start.elapsed()
        );
    }

    /// Move the words derived from `old_name` over to `new_name`.
    ///
    /// Only one copy of each old word is dropped, so another entity still
    /// carrying the old name stays linkable.
    pub fn update_on_rename(&mut self, old_name: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }

        if !old_name.is_empty() {
            self.trie.remove(old_name, true);
            self.trie.remove(&lowercase_first(old_name), true);
        }

        if !new_name.is_empty() {
            for word in [new_name.to_string(), lowercase_first(new_name)] {
                if !self.is_denied(&word) {
                    self.trie.insert(&word);
                }
            }
        }

        debug!("Name index rename {:?} -> {:?}", old_name, new_name);
    }

    /// Longest indexed word at the start of `input`
    pub fn find_longest_prefix_word<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.trie.longest_prefix_match(input)
    }

    pub fn contains_exact(&self, word: &str) -> bool {
        self.trie.contains_exact(word)
    }

    pub fn is_denied(&self, word: &str) -> bool {
        self.denylist.contains(word)
    }

    /// Number of distinct indexed words
    pub fn word_count(&self) -> usize {
        self.trie.len()
    }

    /// Incremented on every rebuild
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn words(&self) -> Vec<(String, u32)> {
        self.trie.words()
    }
}

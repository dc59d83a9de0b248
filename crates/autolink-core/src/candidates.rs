//! Ordered candidate list for the line autolinker
//!
//! Without a trie the line path approximates longest-match by trying aliases
//! from longest to shortest. Candidates also carry the entity key, which the
//! line path uses as the link target.

use std::cmp::Reverse;

use crate::entity::{lowercase_first, Entity, EntityKind};

/// Characters that end a word on the line path
pub const LINE_BOUNDARY_CHARS: &str = " \t,:;.!?<>{}&()-+/*";

pub(crate) fn is_line_boundary(c: char) -> bool {
    LINE_BOUNDARY_CHARS.contains(c)
}

/// One alias an entity can be linked by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub alias: String,
    pub folded_alias: String,
    pub key: String,
    pub kind: EntityKind,
}

/// A candidate accepted at the start of some text
#[derive(Debug, Clone, Copy)]
pub struct CandidateHit<'a> {
    pub candidate: &'a Candidate,
    pub case_folded: bool,
}

impl<'a> CandidateHit<'a> {
    /// The alias as it matched the text
    pub fn label(&self) -> &'a str {
        if self.case_folded {
            &self.candidate.folded_alias
        } else {
            &self.candidate.alias
        }
    }

    /// Byte length of the matched text
    pub fn len(&self) -> usize {
        self.label().len()
    }
}

/// Notebooks and Notes ordered by descending alias length
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
}

impl CandidateList {
    /// Build from the linkable entities, skipping aliases `is_denied` rejects.
    ///
    /// Ordering is stable: equal lengths keep Notebooks ahead of Notes and
    /// otherwise keep input order.
    pub fn build<'a, I, F>(entities: I, is_denied: F) -> Self
    where
        I: IntoIterator<Item = &'a Entity>,
        F: Fn(&str) -> bool,
    {
        let mut candidates = Vec::new();
        for entity in entities {
            if !entity.kind.is_autolinkable() {
                continue;
            }
            let aliases = std::iter::once(entity.name.as_str()).chain(entity.abbreviation());
            for alias in aliases {
                if alias.is_empty() || is_denied(alias) {
                    continue;
                }
                candidates.push(Candidate {
                    alias: alias.to_string(),
                    folded_alias: lowercase_first(alias),
                    key: entity.key.clone(),
                    kind: entity.kind,
                });
            }
        }

        candidates.sort_by_key(|c| {
            (
                Reverse(c.alias.chars().count()),
                c.kind != EntityKind::Notebook,
            )
        });
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// First candidate whose alias starts `text` as a whole word.
    ///
    /// Each candidate is tried as written and then, when `case_insensitive`,
    /// with its first character lowercased, before moving to the next one.
    pub fn match_prefix(&self, text: &str, case_insensitive: bool) -> Option<CandidateHit<'_>> {
        self.candidates.iter().find_map(|candidate| {
            if whole_word_prefix(text, &candidate.alias) {
                Some(CandidateHit {
                    candidate,
                    case_folded: false,
                })
            } else if case_insensitive && whole_word_prefix(text, &candidate.folded_alias) {
                Some(CandidateHit {
                    candidate,
                    case_folded: true,
                })
            } else {
                None
            }
        })
    }
}

fn whole_word_prefix(text: &str, alias: &str) -> bool {
    text.strip_prefix(alias).is_some_and(|rest| {
        rest.chars().next().map_or(true, is_line_boundary)
    })
}

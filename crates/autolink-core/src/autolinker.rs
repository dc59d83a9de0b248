//! The autolinker interface shared by the document and line implementations

use std::time::{Duration, Instant};

use crate::candidates::CandidateList;
use crate::error::AutolinkResult;
use crate::name_index::NameIndex;

/// Soft time limit of one autolinking pass
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Expires `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    pub fn from_budget(budget: Option<Duration>) -> Self {
        budget.map_or_else(Self::none, Self::after)
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

/// Options that shape matching and link output
#[derive(Debug, Clone)]
pub struct AutolinkOptions {
    pub case_insensitive: bool,
    /// Prepended to the entity name to form document-path link URLs
    pub link_prefix: String,
}

impl Default for AutolinkOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            link_prefix: autolink_config::DEFAULT_LINK_PREFIX.to_string(),
        }
    }
}

/// Everything an autolinker reads during one pass
#[derive(Debug, Clone, Copy)]
pub struct AutolinkContext<'a> {
    pub index: &'a NameIndex,
    pub candidates: &'a CandidateList,
    pub options: &'a AutolinkOptions,
    pub deadline: Deadline,
}

/// A whole-word match found while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Byte offset in the scanned text
    pub start: usize,
    /// Byte length in the scanned text
    pub len: usize,
    /// Indexed word or alias that matched
    pub matched: String,
    /// The match needed the first character folded to lowercase
    pub case_folded: bool,
}

impl MatchCandidate {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Output of one autolinking pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autolinked {
    pub text: String,
    /// Number of links injected
    pub links: usize,
    /// The deadline expired and part of the body was left unprocessed
    pub truncated: bool,
}

impl Autolinked {
    /// The input, untouched
    pub fn unchanged(body: &str) -> Self {
        Self {
            text: body.to_string(),
            links: 0,
            truncated: false,
        }
    }
}

/// Rewrites a note body, injecting links to known entities
pub trait Autolinker {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn process(&self, body: &str, ctx: &AutolinkContext<'_>) -> AutolinkResult<Autolinked>;
}

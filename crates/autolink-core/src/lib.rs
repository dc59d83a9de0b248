//! Autolink Core
//!
//! Finds exact, whole-word mentions of known entity names in Markdown notes
//! and turns them into links, without touching code, math, existing links or
//! URLs. This crate provides:
//! - A reference-counted prefix trie and the name index built on it
//! - A document autolinker that edits a parsed tree (pulldown-cmark backed)
//! - A line autolinker fallback with regex-protected lines
//! - [`AutolinkService`], which owns the index and picks the engine from config

pub mod autolinker;
pub mod candidates;
pub mod document;
pub mod document_autolinker;
pub mod entity;
pub mod error;
pub mod line_autolinker;
pub mod markdown;
pub mod name_index;
pub mod protected;
pub mod service;
pub mod trie;

// Re-export main types for convenience
pub use autolinker::{
    AutolinkContext, AutolinkOptions, Autolinked, Autolinker, Deadline, MatchCandidate,
};
pub use candidates::{Candidate, CandidateHit, CandidateList, LINE_BOUNDARY_CHARS};
pub use document::{DocumentTree, MarkdownEngine, NodeId, NodeKind, NodeView};
pub use document_autolinker::{DocumentAutolinker, Segment, TRAILING_CHARS};
pub use entity::{lowercase_first, Entity, EntityCatalog, EntityKind};
pub use error::{AutolinkError, AutolinkResult};
pub use line_autolinker::LineAutolinker;
pub use markdown::{PulldownEngine, SourceTree};
pub use name_index::NameIndex;
pub use protected::{
    is_protected_line, protected_spans, starts_with_url, BlockFence, ProtectedKind,
    ProtectedSpan,
};
pub use service::{AutolinkService, IndexStats};
pub use trie::PrefixTrie;

pub use autolink_config::{AutolinkConfig, EngineKind};

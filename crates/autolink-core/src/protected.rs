//! Protected regions of Markdown text
//!
//! Existing links, inline code, inline math, bare URLs and fenced blocks must
//! never be split or linked. The line autolinker passes a whole line through
//! when any of these appear in it; the document autolinker relies on the tree
//! for most of them and only needs [`starts_with_url`].

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]+\]\(\S+\)").expect("Invalid link regex"));

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[\s\S]+`").expect("Invalid inline code regex"));

static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\s\S]+\$").expect("Invalid inline math regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://").expect("Invalid URL regex"));

const URL_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "www."];

/// What makes a region protected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedKind {
    Link,
    InlineCode,
    InlineMath,
    Url,
    FencedBlock,
}

/// A byte range of a line that must be left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub kind: ProtectedKind,
    pub range: Range<usize>,
}

/// All protected spans of a single line, ordered by start offset
pub fn protected_spans(line: &str) -> Vec<ProtectedSpan> {
    let patterns: [(&Regex, ProtectedKind); 4] = [
        (&LINK_RE, ProtectedKind::Link),
        (&INLINE_CODE_RE, ProtectedKind::InlineCode),
        (&INLINE_MATH_RE, ProtectedKind::InlineMath),
        (&URL_RE, ProtectedKind::Url),
    ];

    let mut spans: Vec<ProtectedSpan> = patterns
        .iter()
        .flat_map(|(re, kind)| {
            re.find_iter(line).map(move |m| ProtectedSpan {
                kind: *kind,
                range: m.range(),
            })
        })
        .collect();
    spans.sort_by_key(|span| (span.range.start, span.range.end));
    spans
}

/// Whether `line` contains anything the line autolinker must not touch
pub fn is_protected_line(line: &str) -> bool {
    LINK_RE.is_match(line)
        || INLINE_CODE_RE.is_match(line)
        || INLINE_MATH_RE.is_match(line)
        || URL_RE.is_match(line)
}

/// Whether `text` begins with a bare URL
pub fn starts_with_url(text: &str) -> bool {
    URL_PREFIXES.iter().any(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Backtick,
    Tilde,
    Math,
}

impl Fence {
    fn opening(trimmed: &str) -> Option<Self> {
        if trimmed.starts_with("```") {
            Some(Fence::Backtick)
        } else if trimmed.starts_with("~~~") {
            Some(Fence::Tilde)
        } else if trimmed.starts_with("$$") {
            Some(Fence::Math)
        } else {
            None
        }
    }

    fn closes(&self, trimmed: &str) -> bool {
        match self {
            Fence::Backtick => trimmed.starts_with("```"),
            Fence::Tilde => trimmed.starts_with("~~~"),
            Fence::Math => trimmed.starts_with("$$") || trimmed.ends_with("$$"),
        }
    }
}

/// Tracks fenced code and math blocks across consecutive lines
#[derive(Debug, Clone, Default)]
pub struct BlockFence {
    open: Option<Fence>,
}

impl BlockFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while between an opening and a closing delimiter
    pub fn in_block(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line.
    ///
    /// Returns `Some(FencedBlock)` when the line is a delimiter or lies inside
    /// a block. A code fence only closes on the marker that opened it. A line
    /// holding a complete `$$...$$` formula is protected without opening a
    /// block.
    pub fn observe(&mut self, line: &str) -> Option<ProtectedKind> {
        let trimmed = line.trim();

        if let Some(fence) = self.open {
            if fence.closes(trimmed) {
                self.open = None;
            }
            return Some(ProtectedKind::FencedBlock);
        }

        let fence = Fence::opening(trimmed)?;
        let single_line_math = fence == Fence::Math && trimmed.len() > 2 && trimmed.ends_with("$$");
        if !single_line_math {
            self.open = Some(fence);
        }
        Some(ProtectedKind::FencedBlock)
    }
}

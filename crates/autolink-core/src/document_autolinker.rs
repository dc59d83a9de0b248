//! Tree-based autolinker
//!
//! Parses the body, visits plain text directly under paragraphs and splits
//! each such node into text and link siblings using leftmost-longest matching
//! against the [`NameIndex`](crate::NameIndex). Text inside links, emphasis,
//! headings, code and tables is never visited. Replaced nodes are only
//! unlinked once every node has been processed.

use std::time::Instant;
use tracing::{debug, warn};

use crate::autolinker::{AutolinkContext, Autolinked, Autolinker, MatchCandidate};
use crate::document::{DocumentTree, MarkdownEngine, NodeId};
use crate::error::AutolinkResult;
use crate::markdown::PulldownEngine;
use crate::protected::starts_with_url;

/// Characters that separate words in paragraph text
pub const TRAILING_CHARS: &str = " \t,:;.!?<>{}&()-+/*\\_=%~#$^[]'\"";

const MATH_DELIMITER: &str = "$$";

fn is_trailing_char(c: char) -> bool {
    TRAILING_CHARS.contains(c)
}

/// Piece of a split text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link {
        /// Characters as written in the note
        text: String,
        /// Indexed word the link points at
        target: String,
    },
}

/// Paragraph text collected during the read-only walk
struct TextNode {
    id: NodeId,
    parent: Option<NodeId>,
    literal: String,
}

/// Autolinker over a parsed document tree
#[derive(Debug, Clone, Default)]
pub struct DocumentAutolinker<E = PulldownEngine> {
    engine: E,
}

impl DocumentAutolinker<PulldownEngine> {
    pub fn new() -> Self {
        Self::with_engine(PulldownEngine::new())
    }
}

impl<E: MarkdownEngine> DocumentAutolinker<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Split `text` into plain and link segments.
    ///
    /// `in_math` carries the `$$` toggle between text nodes of one paragraph.
    pub fn tokenize(
        &self,
        text: &str,
        ctx: &AutolinkContext<'_>,
        in_math: &mut bool,
    ) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pending = String::new();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];

            if *in_math {
                match rest.find(MATH_DELIMITER) {
                    Some(i) => {
                        let end = i + MATH_DELIMITER.len();
                        pending.push_str(&rest[..end]);
                        pos += end;
                        *in_math = false;
                        continue;
                    }
                    None => {
                        pending.push_str(rest);
                        break;
                    }
                }
            }

            if rest.starts_with(MATH_DELIMITER) {
                pending.push_str(MATH_DELIMITER);
                pos += MATH_DELIMITER.len();
                *in_math = true;
                continue;
            }

            let Some(head) = rest.chars().next() else {
                break;
            };
            if is_trailing_char(head) {
                pending.push(head);
                pos += head.len_utf8();
                continue;
            }

            if !starts_with_url(rest) {
                if let Some(found) = self.match_at(text, pos, ctx) {
                    if !pending.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut pending)));
                    }
                    let end = found.end();
                    segments.push(Segment::Link {
                        text: text[found.start..end].to_string(),
                        target: found.matched,
                    });
                    pos = end;
                    continue;
                }
            }

            // Skip the rest of the token together with its separator
            match rest.find([' ', '\t']) {
                Some(i) => {
                    pending.push_str(&rest[..=i]);
                    pos += i + 1;
                }
                None => {
                    pending.push_str(rest);
                    break;
                }
            }
        }

        if !pending.is_empty() {
            segments.push(Segment::Text(pending));
        }
        segments
    }

    /// Whole-word match of an indexed word starting at `pos`
    fn match_at(
        &self,
        text: &str,
        pos: usize,
        ctx: &AutolinkContext<'_>,
    ) -> Option<MatchCandidate> {
        let rest = &text[pos..];

        // A rejected longest match is not retried with shorter words
        if let Some(word) = ctx.index.find_longest_prefix_word(rest) {
            if ends_word(rest, word.len()) {
                return Some(MatchCandidate {
                    start: pos,
                    len: word.len(),
                    matched: word.to_string(),
                    case_folded: false,
                });
            }
        }

        if !ctx.options.case_insensitive {
            return None;
        }

        let first = rest.chars().next()?;
        let lowered: String = first.to_lowercase().collect();
        if lowered.chars().eq(std::iter::once(first)) {
            return None;
        }

        let folded = format!("{}{}", lowered, &rest[first.len_utf8()..]);
        let word = ctx.index.find_longest_prefix_word(&folded)?;
        if word.len() < lowered.len() {
            return None;
        }
        let len = word.len() - lowered.len() + first.len_utf8();
        ends_word(rest, len).then(|| MatchCandidate {
            start: pos,
            len,
            matched: word.to_string(),
            case_folded: true,
        })
    }
}

fn ends_word(rest: &str, len: usize) -> bool {
    rest.get(len..)
        .is_some_and(|tail| tail.chars().next().map_or(true, is_trailing_char))
}

impl<E: MarkdownEngine> Autolinker for DocumentAutolinker<E> {
    fn name(&self) -> &'static str {
        "document"
    }

    fn process(&self, body: &str, ctx: &AutolinkContext<'_>) -> AutolinkResult<Autolinked> {
        let start = Instant::now();
        let mut tree = self.engine.parse(body)?;

        let mut texts: Vec<TextNode> = Vec::new();
        tree.for_each_node(&mut |view| {
            if view.is_paragraph_text() {
                if let Some(literal) = view.literal {
                    texts.push(TextNode {
                        id: view.id,
                        parent: view.parent,
                        literal: literal.to_string(),
                    });
                }
            }
        });

        let mut zombies = Vec::new();
        let mut links = 0;
        let mut truncated = false;
        let mut paragraph = None;
        let mut in_math = false;

        for (visited, node) in texts.iter().enumerate() {
            if ctx.deadline.expired() {
                warn!(
                    "Autolinking deadline expired after {} of {} text nodes",
                    visited,
                    texts.len()
                );
                truncated = true;
                break;
            }

            if paragraph != node.parent {
                paragraph = node.parent;
                in_math = false;
            }

            let segments = self.tokenize(&node.literal, ctx, &mut in_math);
            if !segments.iter().any(|s| matches!(s, Segment::Link { .. })) {
                continue;
            }

            for segment in &segments {
                match segment {
                    Segment::Text(text) => {
                        tree.insert_text_before(node.id, text);
                    }
                    Segment::Link { text, target } => {
                        let url = format!("{}{}", ctx.options.link_prefix, target);
                        tree.insert_link_before(node.id, text, &url);
                        links += 1;
                    }
                }
            }
            zombies.push(node.id);
        }

        for zombie in zombies {
            tree.unlink(zombie);
        }

        let text = if links == 0 {
            body.to_string()
        } else {
            tree.render()
        };
        debug!(
            "Document autolinker injected {} links over {} text nodes in {:?}",
            links,
            texts.len(),
            start.elapsed()
        );

        Ok(Autolinked {
            text,
            links,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autolinker::{AutolinkOptions, Deadline};
    use crate::candidates::CandidateList;
    use crate::entity::Entity;
    use crate::name_index::NameIndex;
    use std::time::Duration;

    struct Fixture {
        index: NameIndex,
        candidates: CandidateList,
        options: AutolinkOptions,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let entities: Vec<_> = names
                .iter()
                .enumerate()
                .map(|(i, name)| Entity::note(format!("n{i}"), *name))
                .collect();
            let mut index = NameIndex::default();
            index.rebuild(&entities);
            Self {
                index,
                candidates: CandidateList::default(),
                options: AutolinkOptions {
                    case_insensitive: false,
                    link_prefix: "x://e/".to_string(),
                },
            }
        }

        fn case_insensitive(mut self) -> Self {
            self.options.case_insensitive = true;
            self
        }

        fn ctx(&self) -> AutolinkContext<'_> {
            AutolinkContext {
                index: &self.index,
                candidates: &self.candidates,
                options: &self.options,
                deadline: Deadline::none(),
            }
        }

        fn link(&self, body: &str) -> String {
            DocumentAutolinker::new()
                .process(body, &self.ctx())
                .unwrap()
                .text
        }

        fn tokens(&self, text: &str) -> Vec<Segment> {
            let mut in_math = false;
            DocumentAutolinker::new().tokenize(text, &self.ctx(), &mut in_math)
        }
    }

    fn link(text: &str, target: &str) -> Segment {
        Segment::Link {
            text: text.to_string(),
            target: target.to_string(),
        }
    }

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn test_tokenize_splits_around_match() {
        let fx = Fixture::new(&["AAA"]);
        assert_eq!(
            fx.tokens("Text of AAA."),
            vec![text("Text of "), link("AAA", "AAA"), text(".")]
        );
    }

    #[test]
    fn test_tokenize_requires_word_boundary() {
        let fx = Fixture::new(&["AAA"]);
        assert_eq!(fx.tokens("AAABBB"), vec![text("AAABBB")]);
        assert_eq!(fx.tokens("AAA BBB"), vec![link("AAA", "AAA"), text(" BBB")]);
    }

    #[test]
    fn test_rejected_match_skips_token() {
        // "AA" matches inside "AAA" but is not a whole word
        let fx = Fixture::new(&["AA", "text"]);
        assert_eq!(
            fx.tokens("AAA text"),
            vec![text("AAA "), link("text", "text")]
        );
    }

    #[test]
    fn test_longest_match_wins() {
        let fx = Fixture::new(&["New", "New York"]);
        assert_eq!(
            fx.tokens("New York, New Delhi"),
            vec![
                link("New York", "New York"),
                text(", "),
                link("New", "New"),
                text(" Delhi")
            ]
        );
    }

    #[test]
    fn test_tab_separator_preserved() {
        let fx = Fixture::new(&["Beta"]);
        assert_eq!(
            fx.tokens("alpha\tBeta"),
            vec![text("alpha\t"), link("Beta", "Beta")]
        );
    }

    #[test]
    fn test_math_span_not_linked() {
        let fx = Fixture::new(&["x"]);
        assert_eq!(fx.tokens("$$ x $$ x"), vec![text("$$ x $$ "), link("x", "x")]);
    }

    #[test]
    fn test_bare_url_not_linked() {
        let fx = Fixture::new(&["www"]);
        assert_eq!(
            fx.tokens("www.example.com www"),
            vec![text("www.example.com "), link("www", "www")]
        );
    }

    #[test]
    fn test_case_insensitive_keeps_written_text() {
        let fx = Fixture::new(&["rust"]).case_insensitive();
        assert_eq!(fx.tokens("Rust rocks"), vec![link("Rust", "rust"), text(" rocks")]);

        let fx = Fixture::new(&["rust"]);
        assert_eq!(fx.tokens("Rust rocks"), vec![text("Rust rocks")]);
    }

    #[test]
    fn test_case_insensitive_unicode_first_char() {
        let fx = Fixture::new(&["éclair"]).case_insensitive();
        assert_eq!(fx.tokens("Éclair!"), vec![link("Éclair", "éclair"), text("!")]);
    }

    #[test]
    fn test_process_end_to_end() {
        let fx = Fixture::new(&["AAA"]);
        assert_eq!(fx.link("Text of AAA.\n"), "Text of [AAA](x://e/AAA).\n");
    }

    #[test]
    fn test_process_link_after_bang_stays_a_link() {
        let fx = Fixture::new(&["AAA"]);
        assert_eq!(
            fx.link("!AAA is here\n"),
            "\\![AAA](x://e/AAA) is here\n"
        );
        assert_eq!(
            fx.link("AAA!AAA\n"),
            "[AAA](x://e/AAA)\\![AAA](x://e/AAA)\n"
        );
    }

    #[test]
    fn test_process_link_after_backslash_stays_a_link() {
        let fx = Fixture::new(&["AAA"]);
        assert_eq!(
            fx.link("see \\AAA now\n"),
            "see \\\\[AAA](x://e/AAA) now\n"
        );
    }

    #[test]
    fn test_process_leaves_structure_alone() {
        let fx = Fixture::new(&["Rust"]);
        let body = "# Rust\n\n*Rust* and [Rust](http://r) and `Rust`\n\n```\nRust\n```\n";
        assert_eq!(fx.link(body), body);
    }

    #[test]
    fn test_process_lists_and_quotes() {
        let fx = Fixture::new(&["Rust"]);
        assert_eq!(
            fx.link("- learn Rust\n- more\n\n> Rust quote\n"),
            "- learn [Rust](x://e/Rust)\n- more\n\n> [Rust](x://e/Rust) quote\n"
        );
    }

    #[test]
    fn test_process_reports_counts() {
        let fx = Fixture::new(&["A"]);
        let result = DocumentAutolinker::new()
            .process("A and A\n", &fx.ctx())
            .unwrap();
        assert_eq!(result.links, 2);
        assert!(!result.truncated);
    }

    #[test]
    fn test_expired_deadline_leaves_body() {
        let fx = Fixture::new(&["AAA"]);
        let ctx = AutolinkContext {
            deadline: Deadline::after(Duration::ZERO),
            ..fx.ctx()
        };
        let result = DocumentAutolinker::new().process("AAA here\n", &ctx).unwrap();
        assert!(result.truncated);
        assert_eq!(result.links, 0);
        assert_eq!(result.text, "AAA here\n");
    }
}
